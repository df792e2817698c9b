//! REPL – interactive shell over the registered controls.
//!
//! Supported slash-commands:
//!   /help                 – show this list
//!   /list                 – list every control with its current state
//!   /press <id>           – press a button
//!   /set <id> <value>     – set a numeric control
//!   /settings [device]    – show pending operation settings
//!   /quit | /exit         – exit the CLI

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use mowdeck_controls::sim::SimCoordinator;
use mowdeck_controls::{ControlEvent, ControlRegistry, ControlSnapshot, Coordinator};
use tokio::runtime::Handle;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    List,
    Press(String),
    Set(String, f64),
    Settings(Option<String>),
    Quit,
}

/// Parse one input line into a [`Command`].
pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();
    match (cmd, args.as_slice()) {
        ("/help", []) => Ok(Command::Help),
        ("/list", []) => Ok(Command::List),
        ("/press", [id]) => Ok(Command::Press(id.to_string())),
        ("/press", _) => Err("usage: /press <id>".to_string()),
        ("/set", [id, value]) => value
            .parse::<f64>()
            .map(|v| Command::Set(id.to_string(), v))
            .map_err(|_| format!("'{value}' is not a number")),
        ("/set", _) => Err("usage: /set <id> <value>".to_string()),
        ("/settings", []) => Ok(Command::Settings(None)),
        ("/settings", [device]) => Ok(Command::Settings(Some(device.to_string()))),
        ("/quit" | "/exit", []) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command '{other}'")),
    }
}

/// Everything the REPL needs to act on controls.
pub struct Session {
    pub runtime: Handle,
    pub registry: Arc<ControlRegistry>,
    pub coordinators: Vec<Arc<SimCoordinator>>,
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(session: &Session, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "mowdeck>".bold().green());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Ok(Command::Help) => cmd_help(),
            Ok(Command::List) => cmd_list(session),
            Ok(Command::Press(id)) => cmd_dispatch(session, ControlEvent::Press { unique_id: id }),
            Ok(Command::Set(id, value)) => cmd_dispatch(
                session,
                ControlEvent::SetValue {
                    unique_id: id,
                    value,
                },
            ),
            Ok(Command::Settings(device)) => cmd_settings(session, device.as_deref()),
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(msg) => println!(
                "{} {}. Type {} for available commands.",
                "Error:".red(),
                msg.yellow(),
                "/help".bold()
            ),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "mowdeck Commands".bold().underline());
    println!("  {}               – list controls and their state", "/list".bold().cyan());
    println!("  {}         – press a button", "/press <id>".bold().cyan());
    println!("  {}   – set a numeric control", "/set <id> <value>".bold().cyan());
    println!("  {}  – show pending operation settings", "/settings [device]".bold().cyan());
    println!("  {}        – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_list(session: &Session) {
    let snapshots = session.runtime.block_on(session.registry.snapshots());
    for snap in snapshots {
        println!("  {}", format_snapshot(&snap));
    }
}

fn cmd_dispatch(session: &Session, event: ControlEvent) {
    let target = match &event {
        ControlEvent::Press { unique_id } | ControlEvent::SetValue { unique_id, .. } => {
            unique_id.clone()
        }
    };
    match session.runtime.block_on(session.registry.dispatch(event)) {
        Ok(()) => println!("{} {}", "✓".green().bold(), target.bold()),
        Err(e) => println!("{} {}", "✗".red().bold(), e.to_string().red()),
    }
}

fn cmd_settings(session: &Session, device: Option<&str>) {
    let mut shown = 0;
    for coordinator in &session.coordinators {
        if device.is_some_and(|d| d != coordinator.device_name()) {
            continue;
        }
        shown += 1;
        let s = coordinator.operation_settings();
        println!("{}", coordinator.device_name().bold().underline());
        println!("  start_progress          : {}", s.start_progress);
        println!("  toward                  : {}", s.toward);
        println!("  toward_included_angle   : {}", s.toward_included_angle);
        println!("  collect_grass_frequency : {}", s.collect_grass_frequency);
        println!("  blade_height            : {}", s.blade_height);
        println!("  speed                   : {}", s.speed);
        println!("  channel_width           : {}", s.channel_width);
    }
    if shown == 0 {
        println!("{} '{}'", "Unknown device:".red(), device.unwrap_or_default().yellow());
    }
}

/// One-line rendering of a control for `/list`.
pub fn format_snapshot(snap: &ControlSnapshot) -> String {
    match snap {
        ControlSnapshot::Button(b) => format!("[button] {}", b.unique_id),
        ControlSnapshot::Number(n) => {
            let unit = n.unit.map(|u| u.symbol()).unwrap_or_default();
            format!(
                "[number] {} = {}{} ({}..{}, step {})",
                n.unique_id, n.value, unit, n.min, n.max, n.step
            )
        }
    }
}
