//! # Page Crate
//!
//! Page controller for the engine. A [`Tab`] owns one committed document at
//! a time and drives its pipeline: fetch, HTML parse, stylesheets, scripts,
//! style, layout and paint. It also applies the built-in behavior of
//! clicks, typing, scrolling and form submission, and keeps the history.
//!
//! Everything runs synchronously on the caller's thread. Script mutations
//! re-render before the host call returns.

#![forbid(unsafe_code)]

pub mod error;
pub mod forms;
pub mod hittest;
pub mod render;
pub mod tab;
pub mod ua;

pub use error::LoadError;
pub use hittest::hit_test;
pub use render::{Frame, Renderer};
pub use tab::{MouseButton, Tab, TabRequest};
pub use ua::DEFAULT_STYLESHEET;
