//! Unified error types for the CLI and its execution core.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the remote service layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status { code: u16, body: String },
    /// Response arrived but did not have the expected shape.
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error from an HTTP code and response body.
    pub fn status(code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            code,
            body: body.into(),
        }
    }

    /// HTTP status code for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }

    /// True when the service rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body } if body.trim().is_empty() => write!(f, "status {code}"),
            Self::Status { code, body } => write!(f, "status {code}: {}", body.trim()),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// ResolutionError
// ---------------------------------------------------------------------------

/// Failure to map one user-supplied argument onto a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// More than one resource matched with the same strength.
    Ambiguous { arg: String, matches: usize },
    /// Nothing matched.
    NotFound(String),
    /// A cached lookup was attempted before the provider fetched anything.
    Uninitialized(&'static str),
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous { arg, matches } => {
                write!(f, "'{arg}' is ambiguous, found {matches} matches")
            }
            Self::NotFound(arg) => write!(f, "nothing found matching '{arg}'"),
            Self::Uninitialized(kind) => write!(f, "{kind} resolver has no cached data"),
        }
    }
}

impl std::error::Error for ResolutionError {}

// ---------------------------------------------------------------------------
// WaitError
// ---------------------------------------------------------------------------

/// Outcome of a "wait for target state" poll that did not reach its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The poll deadline elapsed before the condition held.
    DeadlineExceeded { target: String, after: Duration },
    /// The surrounding context was cancelled (e.g. Ctrl-C).
    Cancelled { target: String },
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded { target, after } => {
                write!(f, "timed out after {}s waiting for {target}", after.as_secs())
            }
            Self::Cancelled { target } => write!(f, "cancelled while waiting for {target}"),
        }
    }
}

impl std::error::Error for WaitError {}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

/// Top-level error type for one command invocation or one task within it.
#[derive(Debug)]
pub enum CommandError {
    Config(ConfigError),
    Api(ApiError),
    Resolution(ResolutionError),
    /// Free-form failure reported by an action.
    Action(String),
    Timeout(WaitError),
    /// The service rejected the configured username/password.
    InvalidCredentials,
    /// The resolver could not fetch the resources it matches against.
    ResolverUnavailable(ApiError),
    /// Wraps an error that has already been surfaced on the live log.
    Handled(Box<CommandError>),
}

impl CommandError {
    /// Mark this error as already reported to the user.
    pub fn handled(self) -> Self {
        match self {
            handled @ Self::Handled(_) => handled,
            other => Self::Handled(Box::new(other)),
        }
    }

    /// True if the error was already surfaced on the live log.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The underlying error with any `Handled` marker removed.
    pub fn root(&self) -> &CommandError {
        match self {
            Self::Handled(inner) => inner.root(),
            other => other,
        }
    }

    /// True for wait deadline/cancellation failures, handled or not.
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout(_))
    }

    /// True when the failure stems from an interrupted wait.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Self::Timeout(WaitError::Cancelled { .. }))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Resolution(e) => write!(f, "cannot resolve argument: {e}"),
            Self::Action(msg) => write!(f, "{msg}"),
            Self::Timeout(e) => write!(f, "{e}"),
            Self::InvalidCredentials => write!(
                f,
                "invalid credentials: check the configured username and password"
            ),
            Self::ResolverUnavailable(e) => write!(f, "cannot create resolver: {e}"),
            Self::Handled(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<ResolutionError> for CommandError {
    fn from(e: ResolutionError) -> Self {
        Self::Resolution(e)
    }
}

impl From<WaitError> for CommandError {
    fn from(e: WaitError) -> Self {
        Self::Timeout(e)
    }
}
