//! Resource commands and the trait the dispatcher runs them through.

use crate::dispatch::Executor;
use crate::error::CommandError;
use crate::output::Output;
use crate::resolver::ResolutionProvider;
use async_trait::async_trait;

pub mod account;
pub mod network;
pub mod server;
pub mod storage;

/// Concurrency bound for commands that act on many resources.
pub const DEFAULT_MAXIMUM_EXECUTIONS: usize = 10;

/// How a command's positional arguments are turned into resource ids.
pub enum Resolution<'a> {
    /// No positional resource; credentials are validated once instead.
    None,
    /// Every argument must match exactly one resource.
    Only(&'a dyn ResolutionProvider),
    /// Every argument may match any number of resources.
    All(&'a dyn ResolutionProvider),
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Short label used on progress lines, e.g. `server stop`.
    fn name(&self) -> &'static str;

    /// Upper bound on concurrently running actions.
    fn maximum_executions(&self) -> usize {
        1
    }

    fn resolution(&self) -> Resolution<'_>;

    /// Run the action for one resolved value (empty for [`Resolution::None`]).
    async fn execute(&self, exec: &Executor, arg: &str) -> Result<Output, CommandError>;
}
