mod bus;
mod config;
mod engine;
mod modules;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use edscout_edsm::EdsmClient;
use edscout_journal::{discover, full_sync};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::bus::ModuleBus;
use crate::engine::Engine;
use crate::modules::history::HistoryModule;
use crate::modules::notify::NotifyModule;
use crate::modules::route::RouteModule;

#[derive(Debug, Parser)]
#[command(name = "edscout-daemon", about = "Exploration journal companion daemon")]
struct Args {
    /// Journal directory (auto-discovered when omitted)
    #[arg(long)]
    journal_dir: Option<PathBuf>,

    /// Config file path (default: ~/.config/edscout/daemon.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the startup sync once, print the system snapshot, and exit
    #[arg(long)]
    once: bool,

    /// Rebuild the exploration history from every journal file, then exit
    #[arg(long)]
    import_history: bool,

    /// Export the exploration history as CSV to the given path, then exit
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edscout_daemon=info".parse().unwrap())
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("Daemon fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = config::load_config(args.config.as_deref())?;

    let journal_dir = discover::find_journal_dir(
        args.journal_dir
            .clone()
            .or_else(|| cfg.journal_dir_override())
            .as_deref(),
    )?;
    info!("journal directory: {}", journal_dir.display());

    if args.import_history || args.export_csv.is_some() {
        return run_history_tools(&args, &journal_dir);
    }

    if args.once {
        return run_once(&journal_dir);
    }

    info!("edscout-daemon starting");

    // Notices end up in the log; a richer front end would take this receiver.
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();
    let notice_task = tokio::spawn(async move {
        while let Some(text) = notice_rx.recv().await {
            info!("notice: {text}");
        }
    });

    let mut bus = ModuleBus::new();
    if cfg.modules.history {
        bus.register(Box::new(HistoryModule::new(config::history_file_path()?)));
    }
    // Must stay alive for the watcher callbacks to keep firing.
    let mut _route_watcher = None;
    if cfg.modules.route {
        let notices = cfg.modules.notifications.then(|| notice_tx.clone());
        let (route, dirty) = RouteModule::new(journal_dir.clone(), notices);
        bus.register(Box::new(route));
        match watcher::start_route_watcher(&journal_dir, dirty) {
            Ok(w) => _route_watcher = Some(w),
            Err(e) => error!("route watcher unavailable: {e:#}"),
        }
    }
    if cfg.modules.notifications {
        bus.register(Box::new(NotifyModule::new(
            notice_tx.clone(),
            cfg.modules.high_value_threshold,
        )));
    }
    drop(notice_tx);

    let client = Arc::new(EdsmClient::new(
        &cfg.edsm.url,
        Duration::from_secs(cfg.edsm.timeout_secs),
        cfg.edsm.max_retries,
    )?);
    let credentials = cfg
        .edsm_credentials()
        .map(|(c, k)| (c.to_string(), k.to_string()));

    let engine = Engine::new(bus, credentials.is_some());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_handle = tokio::spawn(engine::run_engine(
        journal_dir,
        Duration::from_millis(cfg.journal.poll_interval_ms),
        engine,
        Some(client),
        credentials,
        shutdown_rx,
    ));

    wait_for_shutdown().await;

    info!("Shutdown signal received, stopping...");
    let _ = shutdown_tx.send(true);
    let _ = engine_handle.await;
    let _ = notice_task.await;

    info!("edscout-daemon stopped");
    Ok(())
}

/// One-shot sync: reconstruct the current system from disk and print it.
fn run_once(journal_dir: &std::path::Path) -> Result<()> {
    let report = full_sync(journal_dir).context("startup sync failed")?;
    println!("Current system: {}", report.current_system);
    if report.snapshot.all_bodies_found {
        println!("All bodies found");
    } else if let Some(count) = report.snapshot.body_count {
        println!("{} of {count} bodies scanned", report.snapshot.len());
    }
    for body in report.snapshot.bodies() {
        let distance = body
            .distance_ls
            .map(|d| format!("{d:.0} ls"))
            .unwrap_or_else(|| "?".to_string());
        let value = body
            .estimated_value
            .map(|v| format!("{v} cr"))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:<24} {:<28} {:>12} {:>10}",
            body.display_name(),
            body.type_description.as_deref().unwrap_or("unknown"),
            value,
            distance,
        );
    }
    Ok(())
}

fn run_history_tools(args: &Args, journal_dir: &std::path::Path) -> Result<()> {
    let mut history = HistoryModule::new(config::history_file_path()?);
    if args.import_history {
        let replayed = history.import_all(journal_dir)?;
        println!("Imported {replayed} events");
    } else {
        // Export works off the persisted file.
        use crate::bus::JournalModule;
        history.on_load()?;
    }
    if let Some(path) = &args.export_csv {
        history.export_csv(path)?;
        println!("History exported to {}", path.display());
    }
    Ok(())
}

/// Wait for SIGTERM or SIGINT
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register Ctrl+C handler");
        info!("Received Ctrl+C");
    }
}
