//! Printer poll loop
//!
//! Fetches a snapshot every interval, runs it through the synchronizer and
//! forwards the resulting notifications to the screen.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use klcd_core::traits::{PrinterClient, SerialTx};
use klcd_protocol::Line;

use super::BridgeError;
use crate::shared::Shared;

/// Granularity of the shutdown check while waiting
const SHUTDOWN_CHECK: Duration = Duration::from_millis(100);

/// Poll the printer until shutdown
pub fn run_poll_loop<W>(
    shared: &Shared<W>,
    printer: &mut dyn PrinterClient,
    interval: Duration,
) -> Result<(), BridgeError>
where
    W: SerialTx<Error = io::Error>,
{
    info!("Poll loop started, interval {:?}", interval);

    while !shared.is_shutdown() {
        let started = Instant::now();
        poll_once(shared, printer)?;

        while !shared.is_shutdown() {
            let elapsed = started.elapsed();
            if elapsed >= interval {
                break;
            }
            thread::sleep(SHUTDOWN_CHECK.min(interval - elapsed));
        }
    }

    info!("Poll loop stopped");
    Ok(())
}

/// Run one synchronizer cycle
///
/// An unreachable printer is logged and skipped; the previous snapshot
/// stays in place.
pub fn poll_once<W>(shared: &Shared<W>, printer: &mut dyn PrinterClient) -> Result<(), BridgeError>
where
    W: SerialTx<Error = io::Error>,
{
    let snapshot = match printer.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Printer poll failed: {}", e);
            return Ok(());
        }
    };

    let notifications = shared.lock_state().sync.update(snapshot);
    if notifications.is_empty() {
        return Ok(());
    }
    debug!("Synchronizer emitted {} notification(s)", notifications.len());

    let lines: Vec<Line> = notifications
        .iter()
        .filter_map(|notification| match notification.to_line() {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("Failed to encode {:?}: {}", notification, e);
                None
            }
        })
        .collect();

    shared.send(lines).map_err(|e| {
        shared.request_shutdown();
        BridgeError::Transport(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::shared;
    use klcd_core::state::{PrintState, PrinterSnapshot};
    use klcd_core::testing::FakePrinter;

    fn snapshot(state: PrintState, hotend: f32) -> PrinterSnapshot {
        PrinterSnapshot {
            state,
            hotend: Some(hotend),
            ..Default::default()
        }
    }

    #[test]
    fn test_transitions_reach_screen_once() {
        let (shared, output) = shared();
        let mut printer = FakePrinter::default();

        printer.snapshot = snapshot(PrintState::Standby, 25.0);
        poll_once(&shared, &mut printer).unwrap();
        poll_once(&shared, &mut printer).unwrap();
        printer.snapshot = snapshot(PrintState::Printing, 200.0);
        poll_once(&shared, &mut printer).unwrap();
        printer.snapshot = snapshot(PrintState::Cancelled, 180.0);
        poll_once(&shared, &mut printer).unwrap();

        assert_eq!(output.lines(), vec!["J12", "J04", "J16", "J14"]);
    }

    #[test]
    fn test_fault_overlay_every_cycle() {
        let (shared, output) = shared();
        let mut printer = FakePrinter {
            snapshot: snapshot(PrintState::Printing, 512.0),
            ..Default::default()
        };

        poll_once(&shared, &mut printer).unwrap();
        poll_once(&shared, &mut printer).unwrap();

        assert_eq!(output.lines(), vec!["J10", "J10"]);
        assert_eq!(shared.lock_state().sync.state(), PrintState::Error);
    }

    #[test]
    fn test_offline_printer_keeps_previous_snapshot() {
        let (shared, output) = shared();
        let mut printer = FakePrinter {
            snapshot: snapshot(PrintState::Printing, 200.0),
            ..Default::default()
        };
        poll_once(&shared, &mut printer).unwrap();

        printer.offline = true;
        poll_once(&shared, &mut printer).unwrap();

        assert_eq!(output.lines(), vec!["J04"]);
        assert_eq!(shared.lock_state().sync.state(), PrintState::Printing);
    }

    #[test]
    fn test_loop_exits_on_shutdown() {
        let (shared, _output) = shared();
        shared.request_shutdown();
        let mut printer = FakePrinter::default();
        run_poll_loop(&shared, &mut printer, Duration::from_secs(60)).unwrap();
        // Never polled
        assert!(printer.calls.is_empty());
    }
}
