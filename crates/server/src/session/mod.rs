//! Live game sessions over WebSocket.

pub mod coordinator;
pub mod locks;
pub mod protocol;
pub mod registry;

pub use coordinator::SessionCoordinator;
pub use protocol::{CommandType, ServerMessage, UserGameCommand};
pub use registry::{outbox, ConnectionRegistry, Outbox};
