//! Init command implementation

use crate::config::{Config, PathsConfig};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default config file, refusing to clobber an existing one
/// unless forced.
pub fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    let config_file = base.join("config.toml");

    if config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(config_file.display().to_string()));
    }

    let mut config = Config::default();
    config.paths = PathsConfig {
        config_file,
        base_dir: base,
    };
    config.save()?;

    info!("Initialized at {}", config.paths.base_dir.display());
    Ok(config)
}

/// Print init outcome to console
pub fn print_init(config: &Config) {
    println!("Initialized ledgerlens at {}", config.paths.base_dir.display());
    println!("  config:     {}", config.paths.config_file.display());
    println!("  qdrant:     {}", config.qdrant_url);
    println!("  collection: {}", config.collection_name);
    println!("\nEdit the config file to point at your backends, then run 'ledgerlens ingest'.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(Some(tmp.path().to_path_buf()), false).unwrap();
        assert!(config.paths.config_file.exists());
    }

    #[test]
    fn test_init_refuses_to_clobber() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));

        // force overwrites
        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).is_ok());
    }
}
