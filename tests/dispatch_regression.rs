//! End-to-end dispatch regression suite.
//!
//! The offline tests drive the public API against an in-memory backend. The
//! live probe is `#[ignore]` and needs real credentials in cloudctl.toml or
//! the `CLOUDCTL_*` environment.
//!
//! Run explicitly:
//! `cargo test --test dispatch_regression -- --ignored --nocapture`

use async_trait::async_trait;
use cloudctl::api::{Account, ApiClient, Network, Server, Service, StopType, Storage};
use cloudctl::commands::account::AccountShow;
use cloudctl::commands::server::{ServerList, ServerShow, ServerStart};
use cloudctl::config::{load_config, Config, OutputFormat};
use cloudctl::dispatch::{Dispatcher, Executor};
use cloudctl::error::{ApiError, CommandError};
use cloudctl::output::{render_outputs, Output};
use cloudctl::tui::livelog::LiveLogConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Backend with a fixed server list where every start takes a while.
struct SlowFleet {
    servers: Mutex<Vec<Server>>,
}

impl SlowFleet {
    fn new(count: usize) -> Self {
        let servers = (1..=count)
            .map(|n| Server {
                uuid: format!("00000000-0000-0000-0000-{n:012}"),
                title: format!("node-{n}"),
                hostname: format!("node-{n}.example.com"),
                zone: "de-fra1".into(),
                state: "stopped".into(),
                plan: "2xCPU-4GB".into(),
            })
            .collect();
        Self {
            servers: Mutex::new(servers),
        }
    }
}

#[async_trait]
impl Service for SlowFleet {
    async fn account(&self) -> Result<Account, ApiError> {
        Ok(Account {
            username: "fleet".into(),
            credits: 10.0,
        })
    }

    async fn servers(&self) -> Result<Vec<Server>, ApiError> {
        Ok(self.servers.lock().expect("lock").clone())
    }

    async fn server_details(&self, uuid: &str) -> Result<Server, ApiError> {
        self.servers
            .lock()
            .expect("lock")
            .iter()
            .find(|s| s.uuid == uuid)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "SERVER_NOT_FOUND"))
    }

    async fn start_server(&self, uuid: &str) -> Result<Server, ApiError> {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let mut servers = self.servers.lock().expect("lock");
        let server = servers
            .iter_mut()
            .find(|s| s.uuid == uuid)
            .ok_or_else(|| ApiError::status(404, "SERVER_NOT_FOUND"))?;
        server.state = "started".into();
        Ok(server.clone())
    }

    async fn stop_server(
        &self,
        _uuid: &str,
        _stop_type: StopType,
        _timeout: Duration,
    ) -> Result<Server, ApiError> {
        Err(ApiError::status(409, "SERVER_STATE_ILLEGAL"))
    }

    async fn delete_server(&self, _uuid: &str, _delete_storages: bool) -> Result<(), ApiError> {
        Err(ApiError::status(403, "FORBIDDEN"))
    }

    async fn networks(&self) -> Result<Vec<Network>, ApiError> {
        Ok(Vec::new())
    }

    async fn storages(&self) -> Result<Vec<Storage>, ApiError> {
        Ok(Vec::new())
    }

    async fn delete_storage(&self, _uuid: &str) -> Result<(), ApiError> {
        Err(ApiError::status(403, "FORBIDDEN"))
    }
}

fn executor(service: Arc<dyn Service>) -> Executor {
    let (_cancel, cancelled) = watch::channel(false);
    let mut config = Config::default();
    config.execution.wait_interval_ms = 10;
    Executor::new(config, service, cancelled)
}

fn quiet() -> Dispatcher {
    Dispatcher::new(false, LiveLogConfig::default())
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wildcards_fan_out_for_show_but_not_for_start() {
    let fleet = Arc::new(SlowFleet::new(25));
    let exec = executor(fleet.clone());

    let dispatched = quiet()
        .dispatch(Arc::new(ServerStart::new(true)), &exec, &args(&["node-*"]))
        .await
        .expect("dispatch");
    assert_eq!(dispatched.results().len(), 1);
    assert_eq!(dispatched.exit_code(), 1);
    let servers = fleet.servers().await.expect("servers");
    assert!(servers.iter().all(|s| s.state == "stopped"));

    let dispatched = quiet()
        .dispatch(
            Arc::new(ServerShow::default()),
            &exec,
            &args(&["node-*", "missing"]),
        )
        .await
        .expect("dispatch");

    assert_eq!(dispatched.results().len(), 26);
    assert_eq!(dispatched.failed_count(), 1);
    assert_eq!(dispatched.exit_code(), 1);
}

#[tokio::test]
async fn json_output_reports_failures_with_their_argument() {
    let fleet = Arc::new(SlowFleet::new(3));
    let exec = executor(fleet.clone());

    let dispatched = quiet()
        .dispatch(
            Arc::new(ServerStart::new(false)),
            &exec,
            &args(&["node-1", "node-9", "node-3"]),
        )
        .await
        .expect("dispatch");
    assert_eq!(dispatched.failed_count(), 1);

    let mut buf = Vec::new();
    render_outputs(&dispatched.into_outputs(), OutputFormat::Json, &mut buf).expect("render");
    let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), 3);
    let failure = items
        .iter()
        .find(|item| item.get("error").is_some())
        .expect("error item");
    assert_eq!(failure["argument"], "node-9");
    assert_eq!(
        failure["error"],
        "cannot resolve argument: nothing found matching 'node-9'"
    );
    assert_eq!(
        items
            .iter()
            .filter(|item| item["state"] == "started")
            .count(),
        2
    );
}

#[tokio::test]
async fn list_commands_run_exactly_once() {
    let fleet = Arc::new(SlowFleet::new(4));
    let exec = executor(fleet);

    let dispatched = quiet()
        .dispatch(Arc::new(ServerList), &exec, &[])
        .await
        .expect("dispatch");

    match dispatched.into_outputs().as_slice() {
        [Output::Table(table)] => assert_eq!(table.rows.len(), 4),
        other => panic!("unexpected outputs {other:?}"),
    }
}

#[tokio::test]
#[ignore = "network regression suite; run explicitly"]
async fn live_account_round_trip() {
    let config = load_config(None).expect("load config");
    config.require_credentials().expect("credentials configured");
    let service: Arc<dyn Service> = Arc::new(ApiClient::new(&config.api));
    let exec = executor(service);

    match quiet().dispatch(Arc::new(AccountShow), &exec, &[]).await {
        Ok(dispatched) => assert_eq!(dispatched.failed_count(), 0),
        Err(CommandError::InvalidCredentials) => panic!("credentials rejected by the API"),
        Err(err) => panic!("dispatch failed: {err}"),
    }
}
