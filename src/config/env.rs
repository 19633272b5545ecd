//! Environment variable overrides.
//!
//! `CLOUDCTL_*` variables take precedence over any config file value.

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_USERNAME: &str = "CLOUDCTL_USERNAME";
pub(super) const ENV_PASSWORD: &str = "CLOUDCTL_PASSWORD";
pub(super) const ENV_API_URL: &str = "CLOUDCTL_API_URL";
pub(super) const ENV_CLIENT_TIMEOUT: &str = "CLOUDCTL_CLIENT_TIMEOUT";

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(username) = env_lookup(ENV_USERNAME) {
        config.api.username = username;
    }
    if let Some(password) = env_lookup(ENV_PASSWORD) {
        config.api.password = password;
    }
    if let Some(url) = env_lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
        config.api.url = url;
    }
    if let Some(timeout) = env_lookup(ENV_CLIENT_TIMEOUT) {
        let parsed = timeout.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_CLIENT_TIMEOUT} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Clamp to at least 1 second to avoid "no-timeout" accidental behavior.
        config.api.timeout_secs = parsed.max(1);
    }
    Ok(())
}
