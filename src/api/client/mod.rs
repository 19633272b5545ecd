//! `reqwest`-backed implementation of [`Service`].

mod transport;

use super::types::{
    AccountEnvelope, NetworksEnvelope, ServerEnvelope, ServersEnvelope, StopServerBody,
    StopServerRequest, StoragesEnvelope,
};
use super::{Account, Network, Server, Service, StopType, Storage};
use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;
use tracing::debug;

/// Client for the remote resource API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ApiClient {
    /// Build a client from resolved API configuration.
    pub fn new(config: &ApiConfig) -> Self {
        let http = transport::build_http_client(Duration::from_secs(config.timeout_secs));
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "api request");
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl Service for ApiClient {
    async fn account(&self) -> Result<Account, ApiError> {
        let envelope: AccountEnvelope =
            transport::send_json(self.request(Method::GET, "account")).await?;
        Ok(envelope.account)
    }

    async fn servers(&self) -> Result<Vec<Server>, ApiError> {
        let envelope: ServersEnvelope =
            transport::send_json(self.request(Method::GET, "server")).await?;
        Ok(envelope.servers.server)
    }

    async fn server_details(&self, uuid: &str) -> Result<Server, ApiError> {
        let envelope: ServerEnvelope =
            transport::send_json(self.request(Method::GET, &format!("server/{uuid}"))).await?;
        Ok(envelope.server)
    }

    async fn start_server(&self, uuid: &str) -> Result<Server, ApiError> {
        let envelope: ServerEnvelope = transport::send_json(
            self.request(Method::POST, &format!("server/{uuid}/start")),
        )
        .await?;
        Ok(envelope.server)
    }

    async fn stop_server(
        &self,
        uuid: &str,
        stop_type: StopType,
        timeout: Duration,
    ) -> Result<Server, ApiError> {
        let body = StopServerBody {
            stop_server: StopServerRequest {
                stop_type,
                timeout: timeout.as_secs().max(1).to_string(),
            },
        };
        let envelope: ServerEnvelope = transport::send_json(
            self.request(Method::POST, &format!("server/{uuid}/stop"))
                .json(&body),
        )
        .await?;
        Ok(envelope.server)
    }

    async fn delete_server(&self, uuid: &str, delete_storages: bool) -> Result<(), ApiError> {
        let mut request = self.request(Method::DELETE, &format!("server/{uuid}"));
        if delete_storages {
            request = request.query(&[("storages", "1")]);
        }
        transport::send(request).await?;
        Ok(())
    }

    async fn networks(&self) -> Result<Vec<Network>, ApiError> {
        let envelope: NetworksEnvelope =
            transport::send_json(self.request(Method::GET, "network")).await?;
        Ok(envelope.networks.network)
    }

    async fn storages(&self) -> Result<Vec<Storage>, ApiError> {
        let envelope: StoragesEnvelope =
            transport::send_json(self.request(Method::GET, "storage")).await?;
        Ok(envelope.storages.storage)
    }

    async fn delete_storage(&self, uuid: &str) -> Result<(), ApiError> {
        transport::send(self.request(Method::DELETE, &format!("storage/{uuid}"))).await?;
        Ok(())
    }
}
