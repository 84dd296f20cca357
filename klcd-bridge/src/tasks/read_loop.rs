//! Screen receive loop
//!
//! Assembles lines from the serial port, parses them into command frames
//! and dispatches them. Malformed lines and handler failures are logged and
//! skipped; only a failing transport ends the loop.

use std::io;

use log::{debug, info, trace, warn};

use klcd_core::dispatch::{DispatchError, Registry};
use klcd_core::traits::{PrinterClient, SerialRx, SerialTx};
use klcd_protocol::{CommandFrame, LineParser};

use super::BridgeError;
use crate::shared::Shared;

/// Buffer size for serial reads
const RX_BUF_SIZE: usize = 64;

/// Read and dispatch screen commands until shutdown
///
/// A transport error requests shutdown and is returned.
pub fn run_read_loop<R, W>(
    rx: &mut R,
    shared: &Shared<W>,
    registry: &Registry,
    printer: &mut dyn PrinterClient,
) -> Result<(), BridgeError>
where
    R: SerialRx<Error = io::Error>,
    W: SerialTx<Error = io::Error>,
{
    info!("Read loop started");

    let mut parser = LineParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    while !shared.is_shutdown() {
        let n = match rx.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                shared.request_shutdown();
                return Err(BridgeError::Transport(e));
            }
        };
        if n == 0 {
            // Read timeout
            continue;
        }
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            match parser.feed(byte) {
                Ok(Some(line)) => handle_line(&line, shared, registry, printer)?,
                Ok(None) => {}
                Err(e) => warn!("Dropped screen line: {}", e),
            }
        }
    }

    info!("Read loop stopped");
    Ok(())
}

/// Parse and dispatch one line, writing any reply
pub fn handle_line<W>(
    line: &str,
    shared: &Shared<W>,
    registry: &Registry,
    printer: &mut dyn PrinterClient,
) -> Result<(), BridgeError>
where
    W: SerialTx<Error = io::Error>,
{
    debug!("RX {}", line);

    let frame = match CommandFrame::parse(line) {
        Ok(frame) => frame,
        Err(e) => {
            info!("Ignoring {:?}: {}", line, e);
            return Ok(());
        }
    };

    let result = {
        let mut state = shared.lock_state();
        registry.dispatch(frame, &mut state, printer)
    };

    match result {
        Ok(out) if out.is_empty() => Ok(()),
        Ok(out) => shared.send(out).map_err(|e| {
            shared.request_shutdown();
            BridgeError::Transport(e)
        }),
        Err(DispatchError::UnknownOpcode(opcode)) => {
            debug!("No handler for {}", opcode);
            Ok(())
        }
        Err(e) => {
            warn!("{}", e);
            Ok(())
        }
    }
}
