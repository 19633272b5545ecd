//! CLI entry point for cloudctl.

mod cli;

use clap::Parser;
use cloudctl::api::{ApiClient, Service};
use cloudctl::config::{load_config, Config, OutputFormat};
use cloudctl::dispatch::{Dispatcher, Executor, EXIT_CODE_ERROR, EXIT_CODE_INTERRUPTED};
use cloudctl::output::render_outputs;
use cloudctl::tui::livelog::LiveLogConfig;
use crossterm::style::Stylize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.debug);
    std::process::exit(run(args).await);
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "cloudctl=debug" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn print_error(color: bool, msg: &str) {
    if color {
        eprintln!("{} {msg}", "error:".red().bold());
    } else {
        eprintln!("error: {msg}");
    }
}

fn load(args: &cli::Args) -> Result<Config, String> {
    let mut config = load_config(args.config.as_deref()).map_err(|e| e.to_string())?;

    // Apply CLI overrides.
    if let Some(output) = args.output {
        config.display.output = output;
    }
    if args.no_color {
        config.display.color = false;
    }
    if let Some(secs) = args.client_timeout {
        config.api.timeout_secs = secs.max(1);
    }

    config.require_credentials().map_err(|e| e.to_string())?;
    Ok(config)
}

async fn run(args: cli::Args) -> i32 {
    let config = match load(&args) {
        Ok(config) => config,
        Err(msg) => {
            print_error(!args.no_color, &msg);
            return EXIT_CODE_ERROR;
        }
    };
    let color = config.display.color;
    let (command, raw_args) = args.command.into_invocation();

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling outstanding waits");
            let _ = cancel_tx.send(true);
        }
    });

    let service: Arc<dyn Service> = Arc::new(ApiClient::new(&config.api));
    let exec = Executor::new(config.clone(), service, cancel_rx.clone());

    // Progress goes to stderr for human output only, so JSON runs stay quiet.
    let enable_ui = config.display.output == OutputFormat::Human;
    let log_config = LiveLogConfig {
        color,
        ..LiveLogConfig::default()
    };

    let dispatched = match Dispatcher::new(enable_ui, log_config)
        .dispatch(command, &exec, &raw_args)
        .await
    {
        Ok(dispatched) => dispatched,
        Err(err) => {
            print_error(color, &err.to_string());
            return EXIT_CODE_ERROR;
        }
    };

    let interrupted = *cancel_rx.borrow() || dispatched.was_interrupted();
    let exit_code = if interrupted {
        EXIT_CODE_INTERRUPTED
    } else {
        dispatched.exit_code()
    };

    let outputs = dispatched.into_outputs();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = render_outputs(&outputs, config.display.output, &mut stdout) {
        print_error(color, &format!("cannot write output: {e}"));
        return EXIT_CODE_ERROR;
    }
    exit_code
}
