//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`CLOUDCTL_USERNAME`, `CLOUDCTL_PASSWORD`,
//!    `CLOUDCTL_API_URL`, `CLOUDCTL_CLIENT_TIMEOUT`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./cloudctl.toml in the current directory
//! 4. $XDG_CONFIG_HOME/cloudctl/cloudctl.toml (or the platform equivalent)
//! 5. Built-in defaults
//!
//! CLI flags such as `--output` are applied by the binary on top of this.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

mod defaults;
mod env;
mod types;

use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use types::{ApiConfig, Config, DisplayConfig, ExecutionConfig, OutputFormat};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        dirs::config_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text(path_override, &read_file, &config_root)?;
    debug!(source = %source.display(), "loading config");
    let mut config: Config = toml::from_str(&text)?;
    env::apply_env_overrides(&mut config, &env_lookup)?;
    Ok(config)
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, PathBuf), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, path));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if let Ok(text) = read_file(&local) {
        return Ok((text, local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok((text, global));
        }
    }

    Ok((String::new(), PathBuf::from("<defaults>")))
}

impl Config {
    /// Fail early when the API cannot be authenticated against.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.api.has_credentials() {
            return Ok(());
        }
        Err(ConfigError::Invalid(format!(
            "missing API credentials: set [api] username/password in {CONFIG_FILE_NAME} or the {} and {} environment variables",
            env::ENV_USERNAME,
            env::ENV_PASSWORD
        )))
    }
}
