//! Command dispatch
//!
//! Every opcode is registered once at startup with the parameter shape its
//! handler expects. At runtime a parsed frame is routed to its handler,
//! which reads or updates the bridge state, calls the printer and queues
//! reply lines in an outbox.

pub mod error;
pub mod handlers;
pub mod registry;
pub mod session;

pub use error::{DispatchError, HandlerError, RegistryError};
pub use handlers::default_registry;
pub use registry::{Handler, HandlerDescriptor, Registry, MAX_HANDLERS};
pub use session::{BridgeState, Outbox, Session};
