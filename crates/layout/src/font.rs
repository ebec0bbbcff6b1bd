//! Font selection and text measurement.

use core::fmt;

use style::ComputedStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSlant {
    Roman,
    Italic,
}

/// A font request: point size (CSS pixels × 0.75, truncated), weight, slant
/// and family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub size: u32,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub family: String,
}

impl FontSpec {
    pub fn from_style(style: &ComputedStyle) -> Self {
        let weight = match style.get("font-weight") {
            Some("bold") => FontWeight::Bold,
            _ => FontWeight::Normal,
        };
        let slant = match style.get("font-style") {
            Some("italic") => FontSlant::Italic,
            _ => FontSlant::Roman,
        };
        Self {
            size: (style.font_size_px() * 0.75) as u32,
            weight,
            slant,
            family: style.get("font-family").unwrap_or("Times").to_string(),
        }
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weight = match self.weight {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        };
        let slant = match self.slant {
            FontSlant::Roman => "roman",
            FontSlant::Italic => "italic",
        };
        write!(f, "{} {} {} {}", self.family, self.size, weight, slant)
    }
}

/// Text measurement supplied by the embedder. Layout only needs advance
/// widths and vertical metrics.
pub trait FontMetrics {
    fn measure(&self, font: &FontSpec, text: &str) -> f32;
    fn ascent(&self, font: &FontSpec) -> f32;
    fn descent(&self, font: &FontSpec) -> f32;

    fn linespace(&self, font: &FontSpec) -> f32 {
        self.ascent(font) + self.descent(font)
    }
}

/// Deterministic metrics for headless use: every character advances by a
/// fixed fraction of the pixel size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxFontMetrics;

impl ApproxFontMetrics {
    fn px(font: &FontSpec) -> f32 {
        font.size as f32 / 0.75
    }
}

impl FontMetrics for ApproxFontMetrics {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        let advance = match font.weight {
            FontWeight::Normal => 0.5,
            FontWeight::Bold => 0.55,
        };
        text.chars().count() as f32 * advance * Self::px(font)
    }

    fn ascent(&self, font: &FontSpec) -> f32 {
        (Self::px(font) * 0.8).round()
    }

    fn descent(&self, font: &FontSpec) -> f32 {
        (Self::px(font) * 0.2).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_from_style() {
        let mut style = ComputedStyle::inherit_from(None);
        style.set("font-weight", "bold".into());
        style.set("font-style", "italic".into());
        style.set("font-size", "20px".into());
        let f = FontSpec::from_style(&style);
        assert_eq!(f.size, 15);
        assert_eq!(f.weight, FontWeight::Bold);
        assert_eq!(f.slant, FontSlant::Italic);
        assert_eq!(f.family, "Times");
    }

    #[test]
    fn size_truncates() {
        let mut style = ComputedStyle::inherit_from(None);
        style.set("font-size", "15px".into());
        assert_eq!(FontSpec::from_style(&style).size, 11);
    }

    #[test]
    fn approx_metrics() {
        let f = FontSpec::from_style(&ComputedStyle::inherit_from(None));
        let m = ApproxFontMetrics;
        assert_eq!(f.size, 12);
        assert_eq!(m.measure(&f, "abcd"), 32.0);
        assert_eq!(m.ascent(&f), 13.0);
        assert_eq!(m.descent(&f), 3.0);
        assert_eq!(m.linespace(&f), 16.0);
    }
}
