//! `server` subcommands.

use super::{Command, Resolution, DEFAULT_MAXIMUM_EXECUTIONS};
use crate::api::types::{SERVER_STATE_STARTED, SERVER_STATE_STOPPED};
use crate::api::{Server, StopType};
use crate::dispatch::Executor;
use crate::error::CommandError;
use crate::output::{Details, Output, Table};
use crate::resolver::CachingServer;
use async_trait::async_trait;

fn server_label(provider: &CachingServer, uuid: &str) -> String {
    provider
        .get_cached(uuid)
        .map(|server| server.title)
        .unwrap_or_else(|_| uuid.to_string())
}

/// Poll until the server reports `state`.
async fn wait_for_state(exec: &Executor, uuid: &str, state: &str) -> Result<(), CommandError> {
    let svc = exec.service();
    exec.wait_for(&format!("server {uuid} to be {state}"), || async move {
        svc.server_details(uuid)
            .await
            .map(|server| server.state == state)
    })
    .await
}

fn server_details(server: &Server) -> Details {
    Details::new("Server")
        .row("uuid", "UUID", &server.uuid)
        .row("title", "Title", &server.title)
        .row("hostname", "Hostname", &server.hostname)
        .row("zone", "Zone", &server.zone)
        .row("plan", "Plan", &server.plan)
        .row("state", "State", &server.state)
}

/// `server list`
pub struct ServerList;

#[async_trait]
impl Command for ServerList {
    fn name(&self) -> &'static str {
        "server list"
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::None
    }

    async fn execute(&self, exec: &Executor, _arg: &str) -> Result<Output, CommandError> {
        let servers = exec.service().servers().await?;
        let mut table = Table::new(&[
            ("uuid", "UUID"),
            ("hostname", "Hostname"),
            ("plan", "Plan"),
            ("zone", "Zone"),
            ("state", "State"),
        ]);
        for server in servers {
            table.push_row(vec![
                server.uuid,
                server.hostname,
                server.plan,
                server.zone,
                server.state,
            ]);
        }
        Ok(Output::Table(table))
    }
}

/// `server show`
#[derive(Default)]
pub struct ServerShow {
    provider: CachingServer,
}

#[async_trait]
impl Command for ServerShow {
    fn name(&self) -> &'static str {
        "server show"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::All(&self.provider)
    }

    async fn execute(&self, exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let server = exec.service().server_details(uuid).await?;
        Ok(Output::Details(server_details(&server)))
    }
}

/// `server start`
#[derive(Default)]
pub struct ServerStart {
    provider: CachingServer,
    wait: bool,
}

impl ServerStart {
    pub fn new(wait: bool) -> Self {
        Self {
            provider: CachingServer::new(),
            wait,
        }
    }
}

#[async_trait]
impl Command for ServerStart {
    fn name(&self) -> &'static str {
        "server start"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::Only(&self.provider)
    }

    async fn execute(&self, exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let msg = format!("Starting server {}", server_label(&self.provider, uuid));
        exec.push_progress_started(&msg);

        if self
            .provider
            .get_cached(uuid)
            .is_ok_and(|server| server.is_started())
        {
            exec.push_progress_warning(format!("{msg}: already started"), "nothing to do");
            return Ok(Output::None);
        }

        let server = exec
            .service()
            .start_server(uuid)
            .await
            .map_err(|err| exec.handle_error(&msg, err.into()))?;

        if self.wait {
            exec.push_progress_update(format!("{msg}: waiting to start"));
            wait_for_state(exec, uuid, SERVER_STATE_STARTED)
                .await
                .map_err(|err| exec.handle_error(&msg, err))?;
        }

        exec.push_progress_success(format!("{msg}: success"));
        Output::marshal(&server)
    }
}

/// `server stop`
#[derive(Default)]
pub struct ServerStop {
    provider: CachingServer,
    stop_type: StopType,
    wait: bool,
}

impl ServerStop {
    pub fn new(stop_type: StopType, wait: bool) -> Self {
        Self {
            provider: CachingServer::new(),
            stop_type,
            wait,
        }
    }
}

#[async_trait]
impl Command for ServerStop {
    fn name(&self) -> &'static str {
        "server stop"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::Only(&self.provider)
    }

    async fn execute(&self, exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let msg = format!("Stopping server {}", server_label(&self.provider, uuid));
        exec.push_progress_started(&msg);

        if self
            .provider
            .get_cached(uuid)
            .is_ok_and(|server| server.is_stopped())
        {
            exec.push_progress_warning(format!("{msg}: already stopped"), "nothing to do");
            return Ok(Output::None);
        }

        let timeout = exec.config().execution.wait_timeout();
        let server = exec
            .service()
            .stop_server(uuid, self.stop_type, timeout)
            .await
            .map_err(|err| exec.handle_error(&msg, err.into()))?;

        if self.wait {
            exec.push_progress_update(format!("{msg}: waiting to stop"));
            wait_for_state(exec, uuid, SERVER_STATE_STOPPED)
                .await
                .map_err(|err| exec.handle_error(&msg, err))?;
        }

        exec.push_progress_success(format!("{msg}: success"));
        Output::marshal(&server)
    }
}

/// `server delete`
#[derive(Default)]
pub struct ServerDelete {
    provider: CachingServer,
    delete_storages: bool,
}

impl ServerDelete {
    pub fn new(delete_storages: bool) -> Self {
        Self {
            provider: CachingServer::new(),
            delete_storages,
        }
    }
}

#[async_trait]
impl Command for ServerDelete {
    fn name(&self) -> &'static str {
        "server delete"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::Only(&self.provider)
    }

    async fn execute(&self, exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let msg = format!("Deleting server {}", server_label(&self.provider, uuid));
        exec.push_progress_started(&msg);

        exec.service()
            .delete_server(uuid, self.delete_storages)
            .await
            .map_err(|err| exec.handle_error(&msg, err.into()))?;

        exec.push_progress_success(format!("{msg}: success"));
        Ok(Output::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SERVER_STATE_STARTED;
    use crate::config::Config;
    use crate::dispatch::Dispatcher;
    use crate::testsupport::{server, MockService, SharedBuffer};
    use crate::tui::livelog::LiveLogConfig;
    use std::sync::Arc;
    use tokio::sync::watch;

    fn fixtures() -> Arc<MockService> {
        let mut running = server("0002", "db", "db.example.com");
        running.state = SERVER_STATE_STARTED.to_string();
        Arc::new(MockService::default().with_servers(vec![
            server("0001", "web", "web.example.com"),
            running,
        ]))
    }

    fn executor(svc: Arc<MockService>) -> Executor {
        let (_tx, rx) = watch::channel(false);
        let mut config = Config::default();
        config.execution.wait_interval_ms = 10;
        Executor::new(config, svc, rx)
    }

    fn dispatcher(buf: &SharedBuffer) -> Dispatcher {
        Dispatcher::with_writer(
            Box::new(buf.clone()),
            LiveLogConfig {
                entry_max_width: 80,
                render_pending: false,
                disable_live_rendering: true,
                color: false,
            },
        )
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn list_renders_every_server() {
        let svc = fixtures();
        let output = ServerList
            .execute(&executor(svc), "")
            .await
            .expect("list");
        match output {
            Output::Table(table) => {
                assert_eq!(table.rows.len(), 2);
                assert_eq!(table.rows[1][1], "db.example.com");
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_waits_for_started_state() {
        let svc = fixtures();
        let exec = executor(Arc::clone(&svc));
        let buf = SharedBuffer::default();

        let dispatched = dispatcher(&buf)
            .dispatch(Arc::new(ServerStart::new(true)), &exec, &args(&["web"]))
            .await
            .expect("dispatch");

        assert_eq!(dispatched.failed_count(), 0);
        assert!(svc.stored_server("0001").expect("server").is_started());
        assert_eq!(svc.call_count("start_server"), 1);
        assert!(svc.call_count("server_details 0001") >= 1);
        assert!(buf.contents().contains("Starting server web: success"));
    }

    #[tokio::test]
    async fn start_on_running_server_is_a_warning() {
        let svc = fixtures();
        let exec = executor(Arc::clone(&svc));
        let buf = SharedBuffer::default();

        let dispatched = dispatcher(&buf)
            .dispatch(Arc::new(ServerStart::new(false)), &exec, &args(&["db"]))
            .await
            .expect("dispatch");

        assert_eq!(dispatched.failed_count(), 0);
        assert_eq!(svc.call_count("start_server"), 0);
        let out = buf.contents();
        assert!(out.contains("Starting server db: already started"), "{out}");
        assert!(out.contains("nothing to do"), "{out}");
    }

    #[tokio::test]
    async fn stop_passes_stop_type() {
        let svc = fixtures();
        let exec = executor(Arc::clone(&svc));
        let buf = SharedBuffer::default();

        dispatcher(&buf)
            .dispatch(
                Arc::new(ServerStop::new(StopType::Hard, true)),
                &exec,
                &args(&["db.example.com"]),
            )
            .await
            .expect("dispatch");

        assert_eq!(svc.call_count("stop_server 0002 Hard"), 1);
        assert!(svc.stored_server("0002").expect("server").is_stopped());
    }

    #[tokio::test]
    async fn delete_reports_missing_server_as_handled_failure() {
        let svc = fixtures();
        let exec = executor(Arc::clone(&svc));
        let buf = SharedBuffer::default();
        let delete = ServerDelete::new(true);

        let dispatched = dispatcher(&buf)
            .dispatch(Arc::new(delete), &exec, &args(&["web", "0001"]))
            .await
            .expect("dispatch");

        // both arguments name the same server; only one delete can succeed
        assert_eq!(svc.call_count("delete_server 0001 storages=true"), 2);
        assert_eq!(dispatched.failed_count(), 1);
        assert_eq!(svc.server_count(), 1);
        let failed = dispatched
            .results()
            .iter()
            .find(|r| r.is_error())
            .expect("failed");
        assert!(failed.outcome.as_ref().expect_err("error").is_handled());
        assert!(buf.contents().contains("error: api: status 404: SERVER_NOT_FOUND"));
    }

    #[tokio::test]
    async fn show_expands_patterns() {
        let svc = fixtures();
        let exec = executor(Arc::clone(&svc));
        let buf = SharedBuffer::default();

        let dispatched = dispatcher(&buf)
            .dispatch(Arc::new(ServerShow::default()), &exec, &args(&["*.example.com"]))
            .await
            .expect("dispatch");

        assert_eq!(dispatched.results().len(), 2);
        assert!(dispatched
            .into_outputs()
            .iter()
            .all(|o| matches!(o, Output::Details(_))));
    }
}
