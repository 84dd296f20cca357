//! KLCD - Klipper touchscreen bridge
//!
//! Connects a DGUS-style serial touchscreen to a Klipper printer through
//! the Moonraker API. The screen's commands are dispatched on the main
//! thread; a second thread polls the printer and pushes state changes to
//! the screen.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use log::{error, info, warn};
use signal_hook::consts::signal::{SIGINT, SIGTERM};

use klcd_core::dispatch::{default_registry, BridgeState};
use klcd_protocol::Notification;

use crate::config::BridgeConfig;
use crate::moonraker::MoonrakerClient;
use crate::serial::SerialPort;
use crate::shared::Shared;
use crate::tasks::{run_poll_loop, run_read_loop, BridgeError};

mod config;
mod moonraker;
mod serial;
mod shared;
mod tasks;

/// Bridge a DGUS touchscreen to a Moonraker printer host
#[derive(Debug, Parser)]
#[command(name = "klcd", version, about)]
struct Cli {
    /// Config file (defaults to the embedded bridge.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device of the screen, overrides [serial] port
    #[arg(short, long)]
    port: Option<PathBuf>,

    /// Moonraker base URL, overrides [printer] url
    #[arg(long)]
    printer_url: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: Cli) -> Result<BridgeConfig, BridgeError> {
    let mut config = BridgeConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.serial.port = port;
    }
    if let Some(url) = cli.printer_url {
        config.printer.url = url;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), BridgeError> {
    info!("KLCD bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli)?;
    let registry = default_registry().map_err(BridgeError::Registry)?;
    info!("{} screen commands registered", registry.len());

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown)).map_err(BridgeError::Signal)?;
    }

    let mut port = SerialPort::open(&config.serial.port, config.serial.baud)?;
    info!(
        "Screen on {} at {} baud",
        config.serial.port.display(),
        config.serial.baud
    );

    let shared = Arc::new(Shared::new(
        BridgeState::new(config.settings()),
        port.writer()?,
        shutdown,
    ));

    // Start the screen from its boot page
    match Notification::Reset.to_line() {
        Ok(line) => shared.send([line]).map_err(BridgeError::Transport)?,
        Err(e) => warn!("Failed to encode reset: {}", e),
    }

    info!("Printer host at {}", config.printer.url);
    let client = MoonrakerClient::new(&config.printer.url, config.printer.timeout());

    let poller = {
        let shared = Arc::clone(&shared);
        let mut client = client.clone();
        let interval = config.poll.interval();
        thread::Builder::new()
            .name(String::from("poll"))
            .spawn(move || run_poll_loop(&shared, &mut client, interval))
            .map_err(|source| BridgeError::Spawn {
                name: "poll",
                source,
            })?
    };

    let mut client = client;
    let result = run_read_loop(&mut port, &shared, &registry, &mut client);
    shared.request_shutdown();

    let poll_result = poller.join().map_err(|_| BridgeError::Panicked("poll"))?;
    if let Err(e) = &poll_result {
        warn!("Poll loop failed: {}", e);
    }

    info!("KLCD bridge stopped");
    result.and(poll_result)
}
