//! cloudctl: operate on many remote resources at once from the terminal.
//!
//! The crate is built around a small execution core:
//!
//! - [`resolver`] maps human-friendly names (titles, hostnames, wildcards)
//!   onto canonical resource ids and reports ambiguity per argument.
//! - [`dispatch`] runs one command action per resolved id under a
//!   concurrency bound and aggregates the results in completion order.
//! - [`tui::livelog`] draws one live status line per running task.
//!
//! Resource commands in [`commands`] plug into that core through the
//! [`commands::Command`] trait and talk to the backend only through
//! [`api::Service`].
//!
//! # Quick start
//!
//! ```no_run
//! use cloudctl::api::ApiClient;
//! use cloudctl::commands::server::ServerStop;
//! use cloudctl::config::load_config;
//! use cloudctl::dispatch::{Dispatcher, Executor};
//! use cloudctl::tui::livelog::LiveLogConfig;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let service = Arc::new(ApiClient::new(&config.api));
//! let (_cancel, cancelled) = tokio::sync::watch::channel(false);
//! let exec = Executor::new(config, service, cancelled);
//! let dispatched = Dispatcher::new(true, LiveLogConfig::default())
//!     .dispatch(Arc::new(ServerStop::default()), &exec, &["web-*".to_string()])
//!     .await
//!     .unwrap();
//! std::process::exit(dispatched.exit_code());
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod resolver;
#[cfg(test)]
pub mod testsupport;
pub mod tui;
