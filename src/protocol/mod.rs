//! Transport-facing protocol
//!
//! The engine's three operations (resolve, get policy, set policy) as JSON
//! request/response messages, plus a synchronous handler that any transport
//! (stdio, native messaging, a socket) can drive line by line.

mod handler;
mod messages;

pub use handler::MessageHandler;
pub use messages::*;
