//! # Common Foundation Crate
//!
//! Geometry primitives and engine-wide layout configuration shared by the
//! layout, paint, and page crates.

#![forbid(unsafe_code)]

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle in page coordinates, origin `(x, y)` and size
/// `(w, h)`.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from its top-left and bottom-right corners.
    #[inline]
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x: x1, y: y1, w: x2 - x1, h: y2 - y1 }
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.h
    }

    /// Half-open containment: the left/top edges are inside, the right/bottom
    /// edges are not. Empty rectangles contain nothing.
    #[inline]
    pub fn contains(self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    /// True if the rectangle overlaps the vertical band `[top, bottom]`.
    #[inline]
    pub fn overlaps_band(self, top: f32, bottom: f32) -> bool {
        self.y <= bottom && self.bottom() >= top
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}x{})", self.x, self.y, self.w, self.h)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Viewport and layout constants consumed by layout, paint and the page
/// controller.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Viewport width in CSS pixels.
    pub viewport_width: f32,
    /// Viewport height available to page content.
    pub viewport_height: f32,
    /// Horizontal page margin.
    pub hstep: f32,
    /// Vertical page margin.
    pub vstep: f32,
    /// Distance moved by one scroll notch.
    pub scroll_step: f32,
    /// Width of text, password and button atoms.
    pub input_width: f32,
    /// Edge length of the checkbox square.
    pub checkbox_size: f32,
}

impl EngineConfig {
    /// Width available to the root block after page margins.
    pub fn content_width(&self) -> f32 {
        self.viewport_width - 2.0 * self.hstep
    }

    /// Indentation applied to inline list items.
    pub fn list_indent(&self) -> f32 {
        2.0 * self.hstep
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            hstep: 13.0,
            vstep: 18.0,
            scroll_step: 100.0,
            input_width: 200.0,
            checkbox_size: 16.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
