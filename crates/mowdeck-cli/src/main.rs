//! `mowdeck-cli` – mower control shell
//!
//! 1. Loads `~/.mowdeck/config.toml`; runs a **First-Run Wizard** when the
//!    file is absent.
//! 2. Sets up the controls of every configured device against an in-process
//!    coordinator and restores numeric values saved by the previous run.
//! 3. Persists every numeric change to the state file in the background.
//! 4. Drops the user into an **interactive REPL** (`/list`, `/press`, `/set`,
//!    `/settings`, `/help`).

mod config;
mod repl;
mod state;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use mowdeck_controls::sim::SimCoordinator;
use mowdeck_controls::{BroadcastNotifier, ControlRegistry, setup_device};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

fn main() {
    let _guard = telemetry::init_tracing("mowdeck");

    print_banner();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – exiting …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    // ── Config ────────────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            std::process::exit(1);
        }
    };

    // ── Platform setup ────────────────────────────────────────────────────
    let notifier = Arc::new(BroadcastNotifier::default());
    let mut registry = ControlRegistry::new();
    let mut coordinators = Vec::with_capacity(cfg.devices.len());
    for device in &cfg.devices {
        let coordinator = Arc::new(SimCoordinator::new(device.name.clone()));
        match setup_device(
            coordinator.clone(),
            Arc::new(device.limits.clone()),
            notifier.clone(),
            &mut registry,
        ) {
            Ok(count) => {
                println!("  {} {} ({} controls)", "✓".green(), device.name.bold(), count);
                coordinators.push(coordinator);
            }
            Err(e) => println!("  {} {}: {}", "✗".red(), device.name.bold(), e),
        }
    }
    let registry = Arc::new(registry);

    // ── Restore ───────────────────────────────────────────────────────────
    let state_path = cfg.resolved_state_path();
    match state::load_from(&state_path) {
        Ok(Some(saved)) => {
            let restored = runtime.block_on(registry.restore(&saved.numbers));
            info!(restored, saved_at = %saved.saved_at, "restored numeric controls");
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "ignoring unreadable state file"),
    }

    runtime.spawn(persist_changes(
        registry.clone(),
        notifier.clone(),
        state_path,
    ));

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    let session = repl::Session {
        runtime: runtime.handle().clone(),
        registry,
        coordinators,
    };
    repl::run(&session, shutdown);
}

/// Write all numeric values to `path` whenever one of them changes.
async fn persist_changes(
    registry: Arc<ControlRegistry>,
    notifier: Arc<BroadcastNotifier>,
    path: PathBuf,
) {
    let mut rx = notifier.subscribe();
    loop {
        match rx.recv().await {
            Ok(_) => {}
            Err(RecvError::Lagged(n)) => warn!(lagged_by = n, "state persister lagged"),
            Err(RecvError::Closed) => break,
        }
        let saved = state::SavedState::from_snapshots(registry.snapshots().await);
        if let Err(e) = state::save_to(&saved, &path) {
            warn!(error = %e, "failed to persist control state");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().green());
    println!("{}", "  ║      mowdeck First-Run Wizard        ║".bold().green());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().green());
    println!();
    println!("  No configuration found.  Let's add your mower.\n");

    let mut cfg = config::Config::default();
    let name = prompt_line(
        &format!("  Device name [{}]: ", cfg.devices[0].name),
        &cfg.devices[0].name,
    );
    cfg.devices[0].name = name;

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

fn print_banner() {
    println!();
    println!("  {} {}",
        "mowdeck".bold().green(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Robotic mower controls");
    println!();
}

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
