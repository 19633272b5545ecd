//! Default configuration constants.

/// Default API base URL.
pub(super) const DEFAULT_API_URL: &str = "https://api.upcloud.com/1.3";
/// Default timeout for one API request.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 60;
/// Poll interval for "wait for target state" loops.
pub(super) const DEFAULT_WAIT_INTERVAL_MS: u64 = 1_000;
/// Deadline for "wait for target state" loops.
pub(super) const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

/// File name searched for in the working directory and config root.
pub(super) const CONFIG_FILE_NAME: &str = "cloudctl.toml";
/// Directory under the platform config root.
pub(super) const CONFIG_DIR_NAME: &str = "cloudctl";
