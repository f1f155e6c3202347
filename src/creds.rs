//! Credential store for WhatsApp session files
//!
//! Loads a `creds.json`, checks the registration indicators, and applies the
//! one repair this tool exists for: flipping a stuck `registered: false` back
//! to true when the account and identity fields show that registration
//! actually completed.
//!
//! The record is handled as an untyped JSON object so every key the protocol
//! client stores passes through unchanged; only `registered` is ever written.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::BACKUP_SUFFIX;

/// A credential record: an arbitrary JSON object read from disk.
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("credentials file not found at {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("path exists but is not a file: {}", .path.display())]
    NotAFile { path: PathBuf },
    #[error("invalid JSON in credentials file: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("credentials I/O failed: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("operation interrupted")]
    Interrupted,
}

impl From<io::Error> for RepairError {
    fn from(source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::Interrupted {
            RepairError::Interrupted
        } else {
            RepairError::Io { source }
        }
    }
}

impl From<serde_json::Error> for RepairError {
    fn from(source: serde_json::Error) -> Self {
        RepairError::Parse { source }
    }
}

/// Loose truthiness the credential schema relies on: null, false, zero, and
/// empty strings/arrays/objects all count as absent.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Registration indicators derived from a credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationStatus {
    /// An identity key pair is present (`account` key is truthy).
    pub has_account: bool,
    /// The account has an assigned identifier (`me.id` is truthy).
    pub has_me: bool,
    /// The persisted `registered` flag, false when absent.
    pub registered: bool,
    /// True when the flag contradicts the identity data and must be rewritten.
    pub needs_fix: bool,
}

/// Check the registration indicators in a credential record.
///
/// A missing or non-object `me` is treated as empty, never an error.
pub fn assess(record: &Record) -> RegistrationStatus {
    let has_account = record.get("account").map(truthy).unwrap_or(false);
    let has_me = record
        .get("me")
        .and_then(Value::as_object)
        .and_then(|me| me.get("id"))
        .map(truthy)
        .unwrap_or(false);
    let registered = record.get("registered").map(truthy).unwrap_or(false);

    RegistrationStatus {
        has_account,
        has_me,
        registered,
        needs_fix: has_account && has_me && !registered,
    }
}

/// Apply the registration fix in memory. Returns true when the record was
/// mutated; an already-consistent record is returned untouched.
pub fn repair(record: &mut Record) -> bool {
    if !assess(record).needs_fix {
        return false;
    }
    record.insert("registered".to_string(), Value::Bool(true));
    true
}

/// Result of a repair run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// The flag was stuck at false; the file was rewritten.
    Repaired,
    /// Credentials were already consistent; nothing was written.
    NoFixNeeded,
}

/// Manages validation and recovery of one credentials file.
pub struct CredentialStore {
    path: PathBuf,
    backup: bool,
}

impl CredentialStore {
    /// Create a store for the given credentials path. Backups are enabled
    /// by default.
    pub fn new(path: PathBuf) -> Self {
        Self { path, backup: true }
    }

    /// Enable or disable the copy-before-overwrite backup.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the pre-overwrite copy is written to
    /// (`creds.json` -> `creds.json.backup`).
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Validate that the credentials file exists, is a regular file, and
    /// contains well-formed JSON.
    pub fn validate(&self) -> Result<(), RepairError> {
        if !self.path.exists() {
            return Err(RepairError::NotFound {
                path: self.path.clone(),
            });
        }
        if !self.path.is_file() {
            return Err(RepairError::NotAFile {
                path: self.path.clone(),
            });
        }
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str::<Value>(&contents)?;
        Ok(())
    }

    /// Load the credential record. A document whose top level is not a JSON
    /// object is rejected as a parse failure.
    pub fn load(&self) -> Result<Record, RepairError> {
        let contents = fs::read_to_string(&self.path)?;
        let record: Record = serde_json::from_str(&contents)?;
        Ok(record)
    }

    /// Write the record back, preserving every key.
    ///
    /// When backups are enabled and the target exists, the current file is
    /// first copied byte-for-byte to the backup path; a failed copy aborts
    /// before the destructive overwrite.
    pub fn save(&self, record: &Record) -> Result<(), RepairError> {
        if self.backup && self.path.exists() {
            let backup_path = self.backup_path();
            fs::copy(&self.path, &backup_path)?;
            println!("  Created backup at {}", backup_path.display());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Run the full recovery: validate, load, assess, and rewrite the flag
    /// when it contradicts the identity data. At most one read, one backup
    /// copy, and one write happen per call.
    pub fn fix_registration_flag(&self) -> Result<FixOutcome, RepairError> {
        self.validate()?;
        let mut record = self.load()?;

        let status = assess(&record);
        println!(
            "  Registration status: account={}, me={}, registered={}",
            status.has_account, status.has_me, status.registered
        );

        if !status.needs_fix {
            println!("  No fix needed - credentials are already correct");
            return Ok(FixOutcome::NoFixNeeded);
        }

        eprintln!("  Detected registered=false bug - applying fix");
        record.insert("registered".to_string(), Value::Bool(true));
        self.save(&record)?;
        println!("  Fixed registration flag: false -> true");
        Ok(FixOutcome::Repaired)
    }
}
