//! Path resolution for folio data.
//!
//! - [`get_folio_dir`] - `~/.folio/` (or `$FOLIO_HOME`)
//! - [`get_default_db_path`] - `~/.folio/folio.redb`

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::constants::{DB_FILE_NAME, HOME_ENV};

/// Get the folio data directory.
///
/// Resolution order:
/// 1. `FOLIO_HOME` environment variable (if set and non-empty)
/// 2. `~/.folio/`
pub fn get_folio_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".folio"))
}

/// Get the default document database path: `~/.folio/folio.redb`
pub fn get_default_db_path() -> Result<PathBuf> {
    Ok(get_folio_dir()?.join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_is_inside_data_dir() {
        let dir = get_folio_dir().unwrap();
        let db = get_default_db_path().unwrap();
        assert_eq!(db.parent(), Some(dir.as_path()));
        assert_eq!(db.file_name().unwrap(), DB_FILE_NAME);
    }
}
