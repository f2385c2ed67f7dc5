//! Persona profiles: the spoofed identity attributes a resolved hostname
//! receives.
//!
//! The resolver only selects personas; applying them to a page is the job of
//! the DOM patcher on the other side of the transport.

pub mod types;

pub use types::{Persona, Screen};
