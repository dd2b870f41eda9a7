use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use nx_cli::cli::{Cli, Command, SyncMode};
use nx_cli::commands;
use nx_cli::workspace::Workspace;
use nx_core::services::compose::Lifecycle;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _guard = setup_logging(cli.debug);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let workspace = Workspace::open(&root)?;

    let ok = match cli.command {
        Command::Status {
            service,
            format,
            detail,
        } => commands::status::run(&workspace, service.as_deref(), format, detail).await?,
        Command::List { filter, format } => {
            commands::list::run(&workspace, filter.as_deref(), format).await?
        }
        Command::Sync {
            check,
            sync,
            remove_orphans,
            yes,
        } => {
            let Some(mode) = SyncMode::from_flags(check, sync, remove_orphans) else {
                color_eyre::eyre::bail!("choose one of --check, --sync or --remove-orphans");
            };
            commands::sync::run(&workspace, mode, yes).await?
        }
        Command::Validate { service, jobs } => {
            commands::validate::run(&workspace, service.as_deref(), jobs).await?
        }
        Command::Up(args) => commands::lifecycle::run(&workspace, Lifecycle::Up, &args).await?,
        Command::Down(args) => commands::lifecycle::run(&workspace, Lifecycle::Down, &args).await?,
        Command::Pull(args) => commands::lifecycle::run(&workspace, Lifecycle::Pull, &args).await?,
        Command::Restart(args) => {
            commands::lifecycle::run(&workspace, Lifecycle::Restart, &args).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Warnings to stderr (`RUST_LOG` overrides); with `--debug`, a full debug log
/// in `.nexus-debug.log`. The returned guard must live for the whole program.
fn setup_logging(debug: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    if !debug {
        tracing_subscriber::registry().with(stderr_layer).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::never(".", ".nexus-debug.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Some(guard)
}
