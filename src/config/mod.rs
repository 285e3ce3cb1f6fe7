mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default locations, tried in order when no path is given.
pub const DEFAULT_PATHS: [&str; 2] = ["./bookshelf.toml", "~/.config/bookshelf/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    expand_paths(&mut config);

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    tracing::debug!("No config file found, using defaults");
    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let raw = config.database.path.to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref()).into_owned();
    config.database.path = PathBuf::from(expanded);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.database.pool_size == 0 {
        anyhow::bail!("database.pool_size must be at least 1");
    }

    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("database.path cannot be empty");
    }

    Ok(())
}
