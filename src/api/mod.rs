//! Remote resource API boundary.
//!
//! The execution core only ever talks to the backend through [`Service`], so
//! tests can substitute an in-memory implementation for [`ApiClient`].

use crate::error::ApiError;
use async_trait::async_trait;
use std::time::Duration;

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{Account, Network, Server, StopType, Storage};

/// Backend operations used by resolvers and command actions.
#[async_trait]
pub trait Service: Send + Sync {
    async fn account(&self) -> Result<Account, ApiError>;

    async fn servers(&self) -> Result<Vec<Server>, ApiError>;

    async fn server_details(&self, uuid: &str) -> Result<Server, ApiError>;

    async fn start_server(&self, uuid: &str) -> Result<Server, ApiError>;

    /// Request a shutdown. `timeout` bounds how long a soft stop may take
    /// before the service forces it.
    async fn stop_server(
        &self,
        uuid: &str,
        stop_type: StopType,
        timeout: Duration,
    ) -> Result<Server, ApiError>;

    async fn delete_server(&self, uuid: &str, delete_storages: bool) -> Result<(), ApiError>;

    async fn networks(&self) -> Result<Vec<Network>, ApiError>;

    async fn storages(&self) -> Result<Vec<Storage>, ApiError>;

    async fn delete_storage(&self, uuid: &str) -> Result<(), ApiError>;
}
