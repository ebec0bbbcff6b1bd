//! Resolved per-node property values and the per-property normalizer.

use std::collections::HashMap;

/// Properties copied from the parent before any rule applies, with the
/// values used at the root.
pub const INHERITED_PROPERTIES: &[(&str, &str)] = &[
    ("font-size", "16px"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("color", "black"),
    ("font-family", "Times"),
];

/// Value stored for `width`/`height` when no usable pixel length applies.
pub const AUTO: &str = "auto";

/// Property name to resolved string value for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    props: HashMap<String, String>,
}

impl ComputedStyle {
    /// Seed values: the parent's inherited properties, or the defaults.
    pub fn inherit_from(parent: Option<&ComputedStyle>) -> Self {
        let mut props = HashMap::new();
        for &(name, default) in INHERITED_PROPERTIES {
            let value = parent.and_then(|p| p.get(name)).unwrap_or(default);
            props.insert(name.to_string(), value.to_string());
        }
        Self { props }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: String) {
        self.props.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Resolved `font-size` in pixels, 16 when unparsable.
    pub fn font_size_px(&self) -> f32 {
        self.get("font-size").and_then(parse_px).unwrap_or(16.0)
    }

    pub fn color(&self) -> &str {
        self.get("color").unwrap_or("black")
    }

    /// `background-color`, defaulting to `transparent`.
    pub fn background_color(&self) -> &str {
        self.get("background-color").unwrap_or("transparent")
    }

    /// Explicit pixel `width`/`height`, or `None` for auto.
    pub fn length(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|v| v.parse::<f32>().ok())
    }
}

/// `"12.5px"` to `12.5`.
pub fn parse_px(value: &str) -> Option<f32> {
    value.strip_suffix("px")?.trim().parse().ok()
}

/// Normalize one declared value. `None` means the declaration is ignored.
///
/// - `font-size`: pixel values pass through; percentages resolve against the
///   parent's pixel size.
/// - `width`/`height`: pixel values become a bare number; negative lengths
///   become `auto`; anything else is kept verbatim.
pub fn compute_value(property: &str, value: &str, parent_font_px: f32) -> Option<String> {
    match property {
        "font-size" => {
            if parse_px(value).is_some() {
                Some(value.to_string())
            } else if let Some(pct) = value.strip_suffix('%') {
                let pct: f32 = pct.trim().parse().ok()?;
                Some(format!("{}px", pct / 100.0 * parent_font_px))
            } else {
                None
            }
        }
        "width" | "height" => match parse_px(value) {
            Some(px) if px < 0.0 => Some(AUTO.to_string()),
            Some(px) => Some(px.to_string()),
            None => Some(value.to_string()),
        },
        _ => Some(value.to_string()),
    }
}
