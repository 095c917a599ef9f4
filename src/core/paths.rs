use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable that relocates the config directory.
pub const CONFIG_DIR_ENV: &str = "DASHCLONE_CONFIG_DIR";

/// Base dashclone config directory (~/.config/dashclone/ unless overridden)
pub fn dashclone() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("dashclone"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("dashclone"))
    }
}

/// Global dashclone.json config file path
pub fn dashclone_json() -> Result<PathBuf> {
    Ok(dashclone()?.join("dashclone.json"))
}
