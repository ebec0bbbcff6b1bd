//! # JS DOM Bindings
//!
//! Capability-scoped bridge between an external script interpreter and the
//! document. Scripts see nodes only as integer handles from a
//! [`HandleTable`]; every DOM operation goes through [`ScriptHost`], which
//! [`DomBridge`] implements over the live tree. Structural mutations
//! re-render synchronously through [`Render`].

#![forbid(unsafe_code)]

pub mod bridge;
pub mod engine;
pub mod error;
pub mod handles;
pub mod host;
pub mod preamble;

pub use bridge::{DomBridge, Render, dispatch_event};
pub use engine::{EventOutcome, NullEngineFactory, NullScriptEngine, ScriptEngine, ScriptEngineFactory};
pub use error::ScriptError;
pub use handles::{Handle, HandleTable};
pub use host::{HostCall, HostValue, IdBindings, ScriptHost};
pub use preamble::RUNTIME_PREAMBLE;
