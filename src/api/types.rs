//! Wire types for the remote resource API.
//!
//! List endpoints wrap their items twice (`{"servers": {"server": [...]}}`);
//! the envelope structs here unwrap that shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub username: String,
    #[serde(default)]
    pub credits: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Server {
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub plan: String,
}

impl Server {
    pub fn is_started(&self) -> bool {
        self.state == SERVER_STATE_STARTED
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SERVER_STATE_STOPPED
    }
}

pub const SERVER_STATE_STARTED: &str = "started";
pub const SERVER_STATE_STOPPED: &str = "stopped";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Network {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Storage {
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub zone: String,
}

/// How a server is asked to shut down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StopType {
    /// Ask the guest OS to shut down cleanly.
    #[default]
    Soft,
    /// Cut power immediately.
    Hard,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountEnvelope {
    pub(crate) account: Account,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerEnvelope {
    pub(crate) server: Server,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServersEnvelope {
    pub(crate) servers: ServerList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerList {
    #[serde(default)]
    pub(crate) server: Vec<Server>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworksEnvelope {
    pub(crate) networks: NetworkList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NetworkList {
    #[serde(default)]
    pub(crate) network: Vec<Network>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoragesEnvelope {
    pub(crate) storages: StorageList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StorageList {
    #[serde(default)]
    pub(crate) storage: Vec<Storage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopServerBody {
    pub(crate) stop_server: StopServerRequest,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopServerRequest {
    pub(crate) stop_type: StopType,
    /// Seconds, sent as a string by the API's convention.
    pub(crate) timeout: String,
}
