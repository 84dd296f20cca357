//! Opcode registry
//!
//! Maps opcodes to handlers with a declared parameter shape. A parsed
//! parameter of a different shape reaches the handler as
//! [`ParsedArg::None`], so handlers only ever see what they asked for or
//! nothing.

use heapless::FnvIndexMap;
use klcd_protocol::{ArgKind, CommandFrame, Opcode, ParsedArg};

use super::error::{DispatchError, HandlerError, RegistryError};
use super::session::{BridgeState, Outbox, Session};
use crate::traits::PrinterClient;

/// Maximum number of registered opcodes
pub const MAX_HANDLERS: usize = 64;

/// Handler function
pub type Handler = fn(&mut Session<'_>, ParsedArg) -> Result<(), HandlerError>;

/// Registered handler with its expected parameter shape
#[derive(Debug, Clone, Copy)]
pub struct HandlerDescriptor {
    /// Opcode this handler serves
    pub opcode: Opcode,
    /// Parameter shape the handler accepts
    pub kind: ArgKind,
    /// Handler function
    pub handler: Handler,
}

/// Opcode to handler table, immutable once built
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: FnvIndexMap<Opcode, HandlerDescriptor, MAX_HANDLERS>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: FnvIndexMap::new(),
        }
    }

    /// Register a handler
    pub fn register(
        &mut self,
        opcode: Opcode,
        kind: ArgKind,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&opcode) {
            return Err(RegistryError::Duplicate(opcode));
        }
        let descriptor = HandlerDescriptor {
            opcode,
            kind,
            handler,
        };
        self.handlers
            .insert(opcode, descriptor)
            .map_err(|_| RegistryError::Full)?;
        Ok(())
    }

    /// Look up the handler for an opcode
    pub fn get(&self, opcode: Opcode) -> Option<&HandlerDescriptor> {
        self.handlers.get(&opcode)
    }

    /// Number of registered opcodes
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no opcode is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route a frame to its handler
    ///
    /// Returns the lines to send. If the handler fails, whatever it queued
    /// is dropped and nothing is sent, and the browser cursor and selection
    /// return to where they were.
    pub fn dispatch(
        &self,
        frame: CommandFrame,
        state: &mut BridgeState,
        printer: &mut dyn PrinterClient,
    ) -> Result<Outbox, DispatchError> {
        let descriptor = self
            .get(frame.opcode)
            .ok_or(DispatchError::UnknownOpcode(frame.opcode))?;

        let argument = if frame.argument.kind() == descriptor.kind {
            frame.argument
        } else {
            ParsedArg::None
        };

        let checkpoint = state.browser.checkpoint();
        let mut out = Outbox::new();
        let mut session = Session::new(state, printer, &mut out);
        if let Err(source) = (descriptor.handler)(&mut session, argument) {
            state.browser.restore(checkpoint);
            return Err(DispatchError::Handler {
                opcode: frame.opcode,
                source,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePrinter;
    use alloc::string::String;
    use alloc::vec;
    use klcd_protocol::{Handle, NodeHandle, Notification, Reply};

    fn echo_numeric(session: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
        let value = match arg {
            ParsedArg::Numeric(value) => value as i32,
            ParsedArg::None => -1,
            _ => return Err(HandlerError::MissingArgument),
        };
        session.out.reply(Reply::FeedRate(value))?;
        Ok(())
    }

    fn notify_then_fail(session: &mut Session<'_>, _arg: ParsedArg) -> Result<(), HandlerError> {
        session.out.notify(Notification::Ready)?;
        Err(HandlerError::NoFileSelected)
    }

    fn browse_then_fail(session: &mut Session<'_>, _arg: ParsedArg) -> Result<(), HandlerError> {
        let browser = &mut session.state.browser;
        browser.select(Handle::Node(NodeHandle::directory(1)))?;
        browser.select(Handle::Node(NodeHandle::file(1)))?;
        Err(HandlerError::NoFileSelected)
    }

    fn run(registry: &Registry, line: &str) -> Result<Outbox, DispatchError> {
        let mut state = BridgeState::default();
        let mut printer = FakePrinter::default();
        registry.dispatch(CommandFrame::parse(line).unwrap(), &mut state, &mut printer)
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        registry.register(Opcode(20), ArgKind::Numeric, echo_numeric).unwrap();
        assert_eq!(
            registry.register(Opcode(20), ArgKind::None, echo_numeric),
            Err(RegistryError::Duplicate(Opcode(20)))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_until_full() {
        let mut registry = Registry::new();
        for n in 0..MAX_HANDLERS as u16 {
            registry.register(Opcode(n), ArgKind::None, echo_numeric).unwrap();
        }
        assert_eq!(
            registry.register(Opcode(999), ArgKind::None, echo_numeric),
            Err(RegistryError::Full)
        );
    }

    #[test]
    fn test_unknown_opcode() {
        let registry = Registry::new();
        assert_eq!(
            run(&registry, "A999").unwrap_err(),
            DispatchError::UnknownOpcode(Opcode(999))
        );
    }

    #[test]
    fn test_matching_argument_passed_through() {
        let mut registry = Registry::new();
        registry.register(Opcode(20), ArgKind::Numeric, echo_numeric).unwrap();
        let out = run(&registry, "A20 S150").unwrap();
        assert_eq!(out.lines()[0].as_str(), "A20V 150");
    }

    #[test]
    fn test_mismatched_argument_becomes_none() {
        let mut registry = Registry::new();
        registry.register(Opcode(20), ArgKind::Numeric, echo_numeric).unwrap();
        let out = run(&registry, "A20 <1-f.idx>").unwrap();
        assert_eq!(out.lines()[0].as_str(), "A20V -1");
    }

    #[test]
    fn test_failed_handler_output_discarded() {
        let mut registry = Registry::new();
        registry.register(Opcode(14), ArgKind::None, notify_then_fail).unwrap();
        assert_eq!(
            run(&registry, "A14").unwrap_err(),
            DispatchError::Handler {
                opcode: Opcode(14),
                source: HandlerError::NoFileSelected,
            }
        );
    }

    #[test]
    fn test_failed_handler_restores_browser() {
        let mut registry = Registry::new();
        registry.register(Opcode(13), ArgKind::Token, browse_then_fail).unwrap();

        let mut state = BridgeState::default();
        state
            .browser
            .update(vec![String::from("sub/a.gcode"), String::from("b.gcode")]);
        let mut printer = FakePrinter::default();

        let result = registry.dispatch(CommandFrame::parse("A13").unwrap(), &mut state, &mut printer);
        assert!(result.is_err());
        assert!(state.browser.at_root());
        assert_eq!(state.browser.selected(), None);
    }
}
