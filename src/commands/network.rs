use super::{Command, Resolution, DEFAULT_MAXIMUM_EXECUTIONS};
use crate::dispatch::Executor;
use crate::error::CommandError;
use crate::output::{Details, Output, Table};
use crate::resolver::CachingNetwork;
use async_trait::async_trait;

/// `network list`
pub struct NetworkList;

#[async_trait]
impl Command for NetworkList {
    fn name(&self) -> &'static str {
        "network list"
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::None
    }

    async fn execute(&self, exec: &Executor, _arg: &str) -> Result<Output, CommandError> {
        let networks = exec.service().networks().await?;
        let mut table = Table::new(&[
            ("uuid", "UUID"),
            ("name", "Name"),
            ("type", "Type"),
            ("zone", "Zone"),
        ]);
        for network in networks {
            table.push_row(vec![network.uuid, network.name, network.kind, network.zone]);
        }
        Ok(Output::Table(table))
    }
}

/// `network show`
///
/// Networks have no details endpoint of their own; the entry cached during
/// resolution is shown.
#[derive(Default)]
pub struct NetworkShow {
    provider: CachingNetwork,
}

#[async_trait]
impl Command for NetworkShow {
    fn name(&self) -> &'static str {
        "network show"
    }

    fn maximum_executions(&self) -> usize {
        DEFAULT_MAXIMUM_EXECUTIONS
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::Only(&self.provider)
    }

    async fn execute(&self, _exec: &Executor, uuid: &str) -> Result<Output, CommandError> {
        let network = self.provider.get_cached(uuid)?;
        Ok(Output::Details(
            Details::new("Network")
                .row("uuid", "UUID", &network.uuid)
                .row("name", "Name", &network.name)
                .row("type", "Type", &network.kind)
                .row("zone", "Zone", &network.zone),
        ))
    }
}
