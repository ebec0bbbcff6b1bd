//! Style, layout and paint for one document, plus the frame handed to the
//! shell.

use std::rc::Rc;

use common::EngineConfig;
use css::CssRule;
use dom::Dom;
use js_dom_bindings::Render;
use layout::{FontMetrics, LayoutContext, LayoutTree, layout_document};
use paint::{DisplayCommand, DisplayList, build_display_list};
use style::{StyleMap, cascade_order, resolve_styles};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Full re-style, re-layout and re-paint on every call. Keeps the last
/// results for hit testing and scrolling.
pub struct Renderer {
    rules: Vec<CssRule>,
    config: EngineConfig,
    metrics: Rc<dyn FontMetrics>,
    styles: StyleMap,
    layout: LayoutTree,
    display_list: DisplayList,
}

impl Renderer {
    pub fn new(rules: Vec<CssRule>, config: EngineConfig, metrics: Rc<dyn FontMetrics>) -> Self {
        Self {
            rules,
            config,
            metrics,
            styles: StyleMap::new(),
            layout: LayoutTree::new(),
            display_list: DisplayList::new(),
        }
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = CssRule>) {
        self.rules.extend(rules);
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    pub fn metrics(&self) -> &dyn FontMetrics {
        self.metrics.as_ref()
    }

    pub fn page_height(&self) -> f32 {
        self.layout.page_height()
    }
}

impl Render for Renderer {
    fn render(&mut self, dom: &Dom) {
        let ordered = cascade_order(&self.rules);
        self.styles = resolve_styles(dom, &ordered);
        let ctx = LayoutContext { dom, styles: &self.styles, config: &self.config, metrics: self.metrics.as_ref() };
        self.layout = layout_document(&ctx);
        self.display_list = build_display_list(&self.layout, dom, self.metrics.as_ref());
        debug!(commands = self.display_list.len(), height = self.layout.page_height(), "rendered");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame
// ─────────────────────────────────────────────────────────────────────────────

/// What the shell paints: the page's display list in page coordinates, the
/// page height and the tab's scroll offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub display_list: DisplayList,
    pub page_height: f32,
    pub scroll: f32,
}

impl Frame {
    /// Commands intersecting the viewport `[scroll, scroll + height]`.
    pub fn visible(&self, scroll: f32, height: f32) -> impl Iterator<Item = &DisplayCommand> {
        self.display_list.iter().filter(move |cmd| cmd.intersects(scroll, scroll + height))
    }
}
