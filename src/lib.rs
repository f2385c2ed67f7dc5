//! Identity Firewall
//!
//! Per-site browser persona resolution. A [`Policy`] holds a set of
//! [`Persona`]s and an ordered list of hostname rules; the
//! [`PersonaEngine`] returns the persona of the first rule that matches a
//! hostname and memoizes positive answers until the policy is replaced.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod persona;
pub mod policy;
pub mod protocol;
pub mod resolver;
pub mod version;

pub use config::FirewallConfig;
pub use error::{Error, ErrorCode, PolicyError, Result};
pub use persona::{Persona, Screen};
pub use policy::{Pattern, Policy, PolicyDocument, Rule};
pub use resolver::{EngineOptions, HostMatcher, PatternMatcher, PersonaEngine};
