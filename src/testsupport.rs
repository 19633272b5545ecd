//! Shared test fixtures for resolver, dispatch and command test modules.
//!
//! `MockService` is an in-memory backend with call recording; `SharedBuffer`
//! captures what a `LiveLog` writes.

use crate::api::types::{SERVER_STATE_STARTED, SERVER_STATE_STOPPED};
use crate::api::{Account, Network, Server, Service, StopType, Storage};
use crate::error::ApiError;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cloneable in-memory writer; every clone appends to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().expect("buffer lock")).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.lock().expect("buffer lock").clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn server(uuid: &str, title: &str, hostname: &str) -> Server {
    Server {
        uuid: uuid.to_string(),
        title: title.to_string(),
        hostname: hostname.to_string(),
        zone: "fi-hel1".to_string(),
        state: SERVER_STATE_STOPPED.to_string(),
        plan: "1xCPU-1GB".to_string(),
    }
}

pub fn network(uuid: &str, name: &str) -> Network {
    Network {
        uuid: uuid.to_string(),
        name: name.to_string(),
        kind: "private".to_string(),
        zone: "fi-hel1".to_string(),
    }
}

pub fn storage(uuid: &str, title: &str) -> Storage {
    Storage {
        uuid: uuid.to_string(),
        title: title.to_string(),
        size: 25,
        state: "online".to_string(),
        kind: "normal".to_string(),
        zone: "fi-hel1".to_string(),
    }
}

/// In-memory backend. Mutating calls change the stored resources.
#[derive(Debug, Default)]
pub struct MockService {
    servers: Mutex<Vec<Server>>,
    networks: Vec<Network>,
    storages: Mutex<Vec<Storage>>,
    fail_lists: bool,
    unauthorized: bool,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl MockService {
    pub fn with_servers(mut self, servers: Vec<Server>) -> Self {
        self.servers = Mutex::new(servers);
        self
    }

    pub fn with_networks(mut self, networks: Vec<Network>) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_storages(mut self, storages: Vec<Storage>) -> Self {
        self.storages = Mutex::new(storages);
        self
    }

    /// Every list endpoint answers 500.
    pub fn failing_lists(mut self) -> Self {
        self.fail_lists = true;
        self
    }

    /// Every endpoint answers 401.
    pub fn unauthorized(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    /// Sleep this long inside every mutating call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn stored_server(&self, uuid: &str) -> Option<Server> {
        self.servers
            .lock()
            .expect("servers lock")
            .iter()
            .find(|s| s.uuid == uuid)
            .cloned()
    }

    pub fn server_count(&self) -> usize {
        self.servers.lock().expect("servers lock").len()
    }

    pub fn storage_count(&self) -> usize {
        self.storages.lock().expect("storages lock").len()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.unauthorized {
            return Err(ApiError::status(401, "AUTHENTICATION_FAILED"));
        }
        Ok(())
    }

    fn list_guard(&self, call: &str) -> Result<(), ApiError> {
        self.record(call.to_string())?;
        if self.fail_lists {
            return Err(ApiError::status(500, "backend unavailable"));
        }
        Ok(())
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn set_server_state(&self, uuid: &str, state: &str) -> Result<Server, ApiError> {
        let mut servers = self.servers.lock().expect("servers lock");
        let server = servers
            .iter_mut()
            .find(|s| s.uuid == uuid)
            .ok_or_else(|| ApiError::status(404, "SERVER_NOT_FOUND"))?;
        server.state = state.to_string();
        Ok(server.clone())
    }
}

#[async_trait]
impl Service for MockService {
    async fn account(&self) -> Result<Account, ApiError> {
        self.record("account".into())?;
        Ok(Account {
            username: "tester".into(),
            credits: 42.5,
        })
    }

    async fn servers(&self) -> Result<Vec<Server>, ApiError> {
        self.list_guard("servers")?;
        Ok(self.servers.lock().expect("servers lock").clone())
    }

    async fn server_details(&self, uuid: &str) -> Result<Server, ApiError> {
        self.record(format!("server_details {uuid}"))?;
        self.stored_server(uuid)
            .ok_or_else(|| ApiError::status(404, "SERVER_NOT_FOUND"))
    }

    async fn start_server(&self, uuid: &str) -> Result<Server, ApiError> {
        self.record(format!("start_server {uuid}"))?;
        self.pause().await;
        self.set_server_state(uuid, SERVER_STATE_STARTED)
    }

    async fn stop_server(
        &self,
        uuid: &str,
        stop_type: StopType,
        _timeout: Duration,
    ) -> Result<Server, ApiError> {
        self.record(format!("stop_server {uuid} {stop_type:?}"))?;
        self.pause().await;
        self.set_server_state(uuid, SERVER_STATE_STOPPED)
    }

    async fn delete_server(&self, uuid: &str, delete_storages: bool) -> Result<(), ApiError> {
        self.record(format!("delete_server {uuid} storages={delete_storages}"))?;
        self.pause().await;
        let mut servers = self.servers.lock().expect("servers lock");
        let before = servers.len();
        servers.retain(|s| s.uuid != uuid);
        if servers.len() == before {
            return Err(ApiError::status(404, "SERVER_NOT_FOUND"));
        }
        Ok(())
    }

    async fn networks(&self) -> Result<Vec<Network>, ApiError> {
        self.list_guard("networks")?;
        Ok(self.networks.clone())
    }

    async fn storages(&self) -> Result<Vec<Storage>, ApiError> {
        self.list_guard("storages")?;
        Ok(self.storages.lock().expect("storages lock").clone())
    }

    async fn delete_storage(&self, uuid: &str) -> Result<(), ApiError> {
        self.record(format!("delete_storage {uuid}"))?;
        self.pause().await;
        let mut storages = self.storages.lock().expect("storages lock");
        let before = storages.len();
        storages.retain(|s| s.uuid != uuid);
        if storages.len() == before {
            return Err(ApiError::status(404, "STORAGE_NOT_FOUND"));
        }
        Ok(())
    }
}
