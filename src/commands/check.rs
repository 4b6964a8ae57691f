//! `folio check` - validate configuration without starting the server.

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, StoreBackend};

/// Load and validate the configuration, printing warnings.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let result = config.validate()?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    println!(
        "Configuration OK: {}:{}, {} admin user(s), store = {}",
        config.server.host,
        config.server.port,
        config.auth.users.len(),
        match config.store.backend {
            StoreBackend::Redb => config.store_path()?.display().to_string(),
            StoreBackend::Memory => "memory".to_string(),
        }
    );
    Ok(())
}
