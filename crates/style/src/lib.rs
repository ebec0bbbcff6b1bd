//! # Style Engine
//!
//! Cascade over tag/class/descendant rules plus inline `style` attributes,
//! producing a fully recomputed [`StyleMap`] on every pass.

pub mod cascade;
pub mod computed;

pub use cascade::{cascade_order, resolve_styles, style_node, StyleMap};
pub use computed::{compute_value, parse_px, ComputedStyle, AUTO, INHERITED_PROPERTIES};
