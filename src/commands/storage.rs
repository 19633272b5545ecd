use super::{Command, Resolution, DEFAULT_MAXIMUM_EXECUTIONS};
use crate::dispatch::Executor;
use crate::error::CommandError;
use crate::output::{Details, Output, Table};
use crate::resolver::CachingStorage;
use async_trait::async_trait;

/// `storage list`
pub struct StorageList;

#[async_trait]
impl Command for StorageList {
    fn name(&self) -> &'static str {
        "storage list"
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::None
    }

    async fn execute(&self, exec: &Executor, _arg: &str) -> Result<Output, CommandError> {
        let storages = exec.service().storages().await?;
        let mut table = Table::new(&[
            ("uuid", "UUID"),
            ("title", "Title"),
            ("type", "Type"),
            ("size", "Size (GiB)"),
            ("state", "State"),
            ("zone", "Zone"),
        ]);
        for storage in storages {
            table.push_row(vec![
                storage.uuid,
                storage.title,
                storage.kind,
                storage.size.to_string(),
                storage.state,
                storage.zone,
            ]);
        }
        Ok(Output::Table(table))
    }
}

/// `storage show`
#[derive(Default)]
pub struct StorageShow {
    provider: CachingStorage,
}

#[async_trait]
impl Command for StorageShow {
    fn name(&self) -> &'static str {
        "storage show"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::All(&self.provider)
    }

    async fn execute(&self, _exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let storage = self.provider.get_cached(uuid)?;
        Ok(Output::Details(
            Details::new("Storage")
                .row("uuid", "UUID", &storage.uuid)
                .row("title", "Title", &storage.title)
                .row("type", "Type", &storage.kind)
                .row("size", "Size (GiB)", storage.size)
                .row("state", "State", &storage.state)
                .row("zone", "Zone", &storage.zone),
        ))
    }
}

/// `storage delete`
#[derive(Default)]
pub struct StorageDelete {
    provider: CachingStorage,
}

#[async_trait]
impl Command for StorageDelete {
    fn name(&self) -> &'static str {
        "storage delete"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::Only(&self.provider)
    }

    async fn execute(&self, exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let title = self
            .provider
            .get_cached(uuid)
            .map(|storage| storage.title)
            .unwrap_or_else(|_| uuid.to_string());
        let msg = format!("Deleting storage {title}");
        exec.push_progress_started(&msg);

        exec.service()
            .delete_storage(uuid)
            .await
            .map_err(|err| exec.handle_error(&msg, err.into()))?;

        exec.push_progress_success(format!("{msg}: success"));
        Ok(Output::None)
    }
}
