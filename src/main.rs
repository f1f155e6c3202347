use anyhow::{Context, Result};
use clap::Parser;
use credfix::config;
use credfix::creds::{assess, CredentialStore, RepairError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "credfix",
    about = "Repairs the stuck 'registered' flag in WhatsApp credential files",
    version
)]
struct Args {
    /// Path to the credentials file (defaults to
    /// ~/.whatsappbot/credentials/whatsapp/default/creds.json)
    path: Option<PathBuf>,

    /// Report registration status and exit (no write)
    #[arg(short, long)]
    check: bool,

    /// Skip the copy-before-overwrite backup
    #[arg(long)]
    no_backup: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    eprintln!("credfix - WhatsApp credential recovery");

    match run(&args) {
        Ok(()) => {
            println!("+ Credential recovery completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if matches!(
                err.downcast_ref::<RepairError>(),
                Some(RepairError::Interrupted)
            ) {
                eprintln!("Operation cancelled by user");
                return ExitCode::from(130);
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(path) = &args.path {
        eprintln!("  Using custom credentials path: {}", path.display());
    }

    let path = config::locate(args.path.clone())
        .context("could not determine the home directory for the default credentials path")?;
    let store = CredentialStore::new(path).with_backup(!args.no_backup);

    if args.check {
        store.validate()?;
        let record = store.load()?;
        let status = assess(&record);
        println!(
            "  Registration status: account={}, me={}, registered={}",
            status.has_account, status.has_me, status.registered
        );
        if status.needs_fix {
            println!("  Fix needed (run without --check to apply)");
        } else {
            println!("  No fix needed - credentials are already correct");
        }
        return Ok(());
    }

    store
        .fix_registration_flag()
        .context("credential recovery failed")?;
    Ok(())
}
