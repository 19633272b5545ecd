//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use cloudctl::api::StopType;
use cloudctl::commands::account::AccountShow;
use cloudctl::commands::network::{NetworkList, NetworkShow};
use cloudctl::commands::server::{ServerDelete, ServerList, ServerShow, ServerStart, ServerStop};
use cloudctl::commands::storage::{StorageDelete, StorageList, StorageShow};
use cloudctl::commands::Command;
use cloudctl::config::OutputFormat;
use std::sync::Arc;

/// Operate on remote servers, networks and storages, many at a time.
#[derive(Debug, Parser)]
#[command(name = "cloudctl", version)]
pub struct Args {
    /// Path to config file (default: ./cloudctl.toml or ~/.config/cloudctl/cloudctl.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Output format for the final result.
    #[arg(short = 'o', long = "output", value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log debug diagnostics to stderr.
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    /// API request timeout in seconds.
    #[arg(
        short = 't',
        long = "client-timeout",
        value_name = "SECONDS",
        global = true
    )]
    pub client_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Inspect the authenticated account.
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Manage servers.
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Inspect networks.
    Network {
        #[command(subcommand)]
        command: NetworkCommand,
    },
    /// Manage storages.
    Storage {
        #[command(subcommand)]
        command: StorageCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show username and remaining credits.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum ServerCommand {
    /// List all servers.
    List,
    /// Show server details.
    Show {
        #[arg(required = true, value_name = "UUID/Title/Hostname")]
        servers: Vec<String>,
    },
    /// Start servers.
    Start {
        #[arg(required = true, value_name = "UUID/Title/Hostname")]
        servers: Vec<String>,
        /// Wait until each server reports `started`.
        #[arg(long)]
        wait: bool,
    },
    /// Stop servers.
    Stop {
        #[arg(required = true, value_name = "UUID/Title/Hostname")]
        servers: Vec<String>,
        /// Shutdown type.
        #[arg(long = "type", value_enum, default_value_t = StopType::Soft)]
        stop_type: StopType,
        /// Wait until each server reports `stopped`.
        #[arg(long)]
        wait: bool,
    },
    /// Delete servers.
    Delete {
        #[arg(required = true, value_name = "UUID/Title/Hostname")]
        servers: Vec<String>,
        /// Also delete attached storages.
        #[arg(long = "delete-storages")]
        delete_storages: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// List all networks.
    List,
    /// Show network details.
    Show {
        #[arg(required = true, value_name = "UUID/Name")]
        networks: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// List all storages.
    List,
    /// Show storage details.
    Show {
        #[arg(required = true, value_name = "UUID/Title")]
        storages: Vec<String>,
    },
    /// Delete storages.
    Delete {
        #[arg(required = true, value_name = "UUID/Title")]
        storages: Vec<String>,
    },
}

impl CliCommand {
    /// The command to dispatch and its raw positional arguments.
    pub fn into_invocation(self) -> (Arc<dyn Command>, Vec<String>) {
        match self {
            Self::Account {
                command: AccountCommand::Show,
            } => invocation(AccountShow, Vec::new()),
            Self::Server { command } => match command {
                ServerCommand::List => invocation(ServerList, Vec::new()),
                ServerCommand::Show { servers } => invocation(ServerShow::default(), servers),
                ServerCommand::Start { servers, wait } => invocation(ServerStart::new(wait), servers),
                ServerCommand::Stop {
                    servers,
                    stop_type,
                    wait,
                } => invocation(ServerStop::new(stop_type, wait), servers),
                ServerCommand::Delete {
                    servers,
                    delete_storages,
                } => invocation(ServerDelete::new(delete_storages), servers),
            },
            Self::Network { command } => match command {
                NetworkCommand::List => invocation(NetworkList, Vec::new()),
                NetworkCommand::Show { networks } => invocation(NetworkShow::default(), networks),
            },
            Self::Storage { command } => match command {
                StorageCommand::List => invocation(StorageList, Vec::new()),
                StorageCommand::Show { storages } => invocation(StorageShow::default(), storages),
                StorageCommand::Delete { storages } => {
                    invocation(StorageDelete::default(), storages)
                }
            },
        }
    }
}

fn invocation<C: Command + 'static>(command: C, args: Vec<String>) -> (Arc<dyn Command>, Vec<String>) {
    let command: Arc<dyn Command> = Arc::new(command);
    (command, args)
}
