//! Handler context
//!
//! A [`Session`] bundles what one dispatched command may touch: the shared
//! bridge state, the printer backend and the outbox for reply lines.

use alloc::vec::Vec;

use klcd_protocol::{EncodeError, Line, ListingLines, Notification, Reply};

use super::error::HandlerError;
use crate::config::BridgeSettings;
use crate::files::FileBrowser;
use crate::state::StateSynchronizer;
use crate::traits::PrinterClient;

/// State shared by the read loop and the poll loop
#[derive(Debug, Clone)]
pub struct BridgeState {
    /// Latest telemetry and transition tracking
    pub sync: StateSynchronizer,
    /// File tree, cursor and selection
    pub browser: FileBrowser,
    /// Static settings
    pub settings: BridgeSettings,
}

impl BridgeState {
    /// Create the initial state: no snapshot, no tree, cursor at root
    pub fn new(settings: BridgeSettings) -> Self {
        Self {
            sync: StateSynchronizer::new(settings.safety),
            browser: FileBrowser::new(settings.display.name_style()),
            settings,
        }
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::new(BridgeSettings::default())
    }
}

/// Lines queued by one dispatch, written to the screen together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    lines: Vec<Line>,
}

impl Outbox {
    /// Create an empty outbox
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Queue an encoded line
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Queue a notification
    pub fn notify(&mut self, notification: Notification) -> Result<(), EncodeError> {
        self.lines.push(notification.to_line()?);
        Ok(())
    }

    /// Queue a query reply
    pub fn reply(&mut self, reply: Reply<'_>) -> Result<(), EncodeError> {
        self.lines.push(reply.to_line()?);
        Ok(())
    }

    /// Queue a listing frame
    pub fn listing(&mut self, frame: ListingLines) {
        self.lines.extend(frame);
    }

    /// Queued lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl IntoIterator for Outbox {
    type Item = Line;
    type IntoIter = alloc::vec::IntoIter<Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

/// Context passed to a handler
pub struct Session<'a> {
    /// Shared bridge state
    pub state: &'a mut BridgeState,
    /// Printer backend
    pub printer: &'a mut dyn PrinterClient,
    /// Reply lines for this command
    pub out: &'a mut Outbox,
}

impl<'a> Session<'a> {
    /// Create a session
    pub fn new(
        state: &'a mut BridgeState,
        printer: &'a mut dyn PrinterClient,
        out: &'a mut Outbox,
    ) -> Self {
        Self {
            state,
            printer,
            out,
        }
    }

    /// Fetch the file list and rebuild the tree if it changed
    pub fn refresh_files(&mut self) -> Result<bool, HandlerError> {
        let paths = self.printer.file_list()?;
        Ok(self.state.browser.update(paths))
    }

    /// Queue the listing page starting at item `offset`
    pub fn send_page(&mut self, offset: usize) -> Result<(), HandlerError> {
        let frame = self.state.browser.encode_page(offset)?;
        self.out.listing(frame);
        Ok(())
    }
}
