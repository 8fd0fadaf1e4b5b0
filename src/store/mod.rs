//! Graph store access
//!
//! - `GraphSession`: execute / lookup / checkpoint capability
//! - `EmbeddedSession` over an in-process `MemoryGraph`
//! - `RemoteSession` over HTTP

pub mod embedded;
pub mod memory;
pub mod remote;
pub mod session;

pub use embedded::EmbeddedSession;
pub use memory::{EdgeKey, MemoryGraph, MemoryGraphError, Vertex};
pub use remote::{RemoteSession, StoreStatus};
pub use session::{ExecutionResult, GraphSession, SessionError, SessionResult};
