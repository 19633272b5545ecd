use crate::error::{CommandError, ResolutionError};
use crate::output::Output;

/// One raw argument after resolution. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArgument {
    original: String,
    resolved: String,
    error: Option<ResolutionError>,
}

impl ResolvedArgument {
    pub fn resolved(original: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            resolved: resolved.into(),
            error: None,
        }
    }

    pub fn failed(original: impl Into<String>, error: ResolutionError) -> Self {
        Self {
            original: original.into(),
            resolved: String::new(),
            error: Some(error),
        }
    }

    /// Placeholder for commands that take no positional argument.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn resolved_value(&self) -> &str {
        &self.resolved
    }

    pub fn error(&self) -> Option<&ResolutionError> {
        self.error.as_ref()
    }
}

/// Outcome of one task, produced exactly once per [`ResolvedArgument`].
#[derive(Debug)]
pub struct ExecuteResult {
    pub job: usize,
    pub outcome: Result<Output, CommandError>,
    pub resolved_argument: ResolvedArgument,
}

impl ExecuteResult {
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Convert into an output, turning errors into [`Output::Error`].
    pub fn into_output(self) -> Output {
        match self.outcome {
            Ok(output) => output,
            Err(err) => Output::Error {
                original: self.resolved_argument.original,
                resolved: self.resolved_argument.resolved,
                message: err.to_string(),
            },
        }
    }
}
