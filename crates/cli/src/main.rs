mod cli;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelver_core::{
    load_config, validate_config, CategoryProcessor, Config, QueueDriver, StopReason, WorkQueue,
};

use cli::{AddArgs, Cli, Command, ProcessArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    let span = info_span!("cmd", cmd = cli.command.label());
    if let Err(e) = run(cli).instrument(span.clone()).await {
        span.in_scope(|| error!("Failed to execute: {:#}", e));
        std::process::exit(1);
    }
}

/// Stdout for humans, plus JSON lines appended to `log_file` when given.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let json_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(json_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Add(args) => add(&cli.config, args).await,
        Command::Process(args) => process(&cli.config, args).await,
    }
}

fn read_config(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    let config =
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn add(config_path: &Path, args: &AddArgs) -> Result<()> {
    let work_path = match &args.work_path {
        Some(path) => path.clone(),
        None => read_config(config_path)?.work_path,
    };

    let queue = WorkQueue::new(&work_path).context("Failed to open work queue")?;
    let entry = args.to_entry();
    queue
        .add(&entry)
        .await
        .with_context(|| format!("Failed to add entry {}", entry.hash))?;

    Ok(())
}

async fn process(config_path: &Path, args: &ProcessArgs) -> Result<()> {
    let config = read_config(config_path)?;
    info!(
        work_path = %config.work_path.display(),
        movie_output_path = %config.movie_output_path.display(),
        tv_output_path = %config.tv_output_path.display(),
        dry_run = args.dry_run,
        "Configuration loaded successfully"
    );

    let queue = WorkQueue::new(&config.work_path).context("Failed to open work queue")?;
    let processor = CategoryProcessor::new(config.library(), args.dry_run);
    let driver_config = config
        .driver_config()
        .with_limit(args.limit)
        .with_dry_run(args.dry_run);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        trigger.cancel();
    }
    .in_current_span());

    let mut driver = QueueDriver::new(queue, processor, driver_config);
    let outcome = driver.run(cancel).await.context("Processing stopped")?;

    match outcome.stop {
        StopReason::Cancelled => info!(processed = outcome.processed, "Stopped"),
        StopReason::LimitReached => info!(processed = outcome.processed, "Limit reached"),
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
