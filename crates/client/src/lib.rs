//! Blocks Chat Client Library
//!
//! This library implements the client side of the blocks chat protocol: it
//! owns a single WebSocket connection, interprets inbound frames, renders
//! them through a host-supplied UI capability, and forwards user choices and
//! free-text replies back over the same connection. It is structured into
//! submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based frame format exchanged with the server.
//! - `ui`: The capability interface the embedding host must provide.
//! - `link`: Endpoint derivation and the connection lifecycle (connect + pump).
//! - `session`: The message-dispatch state machine and the guarded send path.

pub mod link;
pub mod protocol;
pub mod session;
pub mod ui;

pub use link::{Endpoint, LinkState, connect};
pub use session::ChatSession;
pub use ui::ChatUi;
