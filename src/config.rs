//! Configuration constants for credfix
//!
//! The default credentials location and the backup suffix are fixed here
//! rather than read from the environment or flags.

use std::path::PathBuf;

/// Application directory under the user's home.
pub const APP_DIR: &str = ".whatsappbot";

/// Account profile used when none is specified.
pub const DEFAULT_PROFILE: &str = "default";

/// Credentials file name inside the profile directory.
pub const CREDS_FILE: &str = "creds.json";

/// Suffix appended to the credentials file name for the pre-overwrite copy.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Get the default credentials path:
/// `~/.whatsappbot/credentials/whatsapp/default/creds.json`
///
/// Returns `None` when the home directory cannot be determined.
pub fn default_creds_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(APP_DIR)
            .join("credentials")
            .join("whatsapp")
            .join(DEFAULT_PROFILE)
            .join(CREDS_FILE)
    })
}

/// Resolve the credentials path: a caller-supplied path wins, otherwise the
/// fixed default. No existence check happens here.
pub fn locate(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path.or_else(default_creds_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_override() {
        let custom = PathBuf::from("/tmp/creds.json");
        assert_eq!(locate(Some(custom.clone())), Some(custom));
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_creds_path() {
            assert!(path.ends_with(".whatsappbot/credentials/whatsapp/default/creds.json"));
        }
    }
}
