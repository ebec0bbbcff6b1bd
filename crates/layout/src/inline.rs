//! Inline formatting: greedy line breaking over words and input atoms.
//!
//! Words are placed left to right; one that would overflow a non-empty line
//! starts a new line. Words containing soft hyphens (U+00AD) may instead be
//! split at the last soft hyphen whose prefix plus `-` still fits.

use common::Rect;
use dom::{NodeData, NodeId};

use crate::block::LayoutContext;
use crate::font::FontSpec;
use crate::tree::{LayoutBox, LayoutBoxId, LayoutBoxKind, LayoutTree};

pub const SOFT_HYPHEN: char = '\u{ad}';

/// An atom waiting for its line to be finished.
struct Atom {
    node: NodeId,
    kind: LayoutBoxKind,
    font: FontSpec,
    x: f32,
    width: f32,
    height: f32,
}

pub struct InlineLayout<'c, 'a, 't> {
    ctx: &'c LayoutContext<'a>,
    tree: &'t mut LayoutTree,
    block: LayoutBoxId,
    area: Rect,
    cursor_x: f32,
    line_y: f32,
    line: Vec<Atom>,
}

impl<'c, 'a, 't> InlineLayout<'c, 'a, 't> {
    pub fn new(ctx: &'c LayoutContext<'a>, tree: &'t mut LayoutTree, block: LayoutBoxId, area: Rect) -> Self {
        Self { ctx, tree, block, area, cursor_x: 0.0, line_y: area.y, line: Vec::new() }
    }

    /// Lay out the inline content of `node`; returns the total line height.
    pub fn run(mut self, node: NodeId) -> f32 {
        let dom = self.ctx.dom;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = dom.node(id) else { continue };
            match &n.data {
                NodeData::Text(text) => self.text(id, text),
                NodeData::Element(e) => match e.tag.as_str() {
                    "br" => self.new_line(),
                    "input" | "button" => self.input(id, &e.attr("type").unwrap_or("").to_ascii_lowercase()),
                    _ if !self.ctx.is_rendered(id) => {}
                    _ => stack.extend(n.children.iter().rev()),
                },
            }
        }
        self.finish_line();
        self.line_y - self.area.y
    }

    fn space(&self, font: &FontSpec) -> f32 {
        self.ctx.metrics.measure(font, " ")
    }

    fn text(&mut self, node: NodeId, text: &str) {
        let style = self.ctx.style(node);
        let font = FontSpec::from_style(&style);
        let color = style.color().to_string();
        for word in text.split_ascii_whitespace() {
            self.word(node, word, &font, &color);
        }
    }

    fn word(&mut self, node: NodeId, word: &str, font: &FontSpec, color: &str) {
        let metrics = self.ctx.metrics;
        let mut rest = word.to_string();
        loop {
            let visible: String = rest.chars().filter(|&c| c != SOFT_HYPHEN).collect();
            let width = metrics.measure(font, &visible);
            let remaining = self.area.w - self.cursor_x;
            if width <= remaining {
                self.push_word(node, visible, width, font, color);
                return;
            }
            if let Some((head, tail)) = self.hyphenate(&rest, remaining, font) {
                let w = metrics.measure(font, &head);
                self.push_word(node, head, w, font, color);
                self.new_line();
                rest = tail;
                continue;
            }
            if self.cursor_x > 0.0 {
                self.new_line();
                continue;
            }
            // Too wide even for an empty line.
            self.push_word(node, visible, width, font, color);
            return;
        }
    }

    /// Split at the last soft hyphen whose visible prefix plus `-` fits in
    /// `room`. Returns the hyphenated head and the raw remainder.
    fn hyphenate(&self, word: &str, room: f32, font: &FontSpec) -> Option<(String, String)> {
        word.match_indices(SOFT_HYPHEN).rev().find_map(|(pos, _)| {
            let prefix: String = word[..pos].chars().filter(|&c| c != SOFT_HYPHEN).collect();
            if prefix.is_empty() {
                return None;
            }
            let head = format!("{prefix}-");
            (self.ctx.metrics.measure(font, &head) <= room)
                .then(|| (head, word[pos + SOFT_HYPHEN.len_utf8()..].to_string()))
        })
    }

    fn push_word(&mut self, node: NodeId, word: String, width: f32, font: &FontSpec, color: &str) {
        let height = self.ctx.metrics.linespace(font);
        self.line.push(Atom {
            node,
            kind: LayoutBoxKind::Text { word, font: font.clone(), color: color.to_string() },
            font: font.clone(),
            x: self.cursor_x,
            width,
            height,
        });
        self.cursor_x += width + self.space(font);
    }

    fn input(&mut self, node: NodeId, input_type: &str) {
        let cfg = self.ctx.config;
        let style = self.ctx.style(node);
        let font = FontSpec::from_style(&style);
        let (width, height) = match input_type {
            "hidden" => (0.0, 0.0),
            "checkbox" => (cfg.checkbox_size, cfg.checkbox_size),
            _ => (cfg.input_width, self.ctx.metrics.linespace(&font)),
        };
        if self.cursor_x + width > self.area.w && self.cursor_x > 0.0 {
            self.new_line();
        }
        let advance = if width > 0.0 { width + self.space(&font) } else { 0.0 };
        self.line.push(Atom {
            node,
            kind: LayoutBoxKind::Input { font: font.clone(), color: style.color().to_string() },
            font,
            x: self.cursor_x,
            width,
            height,
        });
        self.cursor_x += advance;
    }

    fn new_line(&mut self) {
        self.finish_line();
        self.cursor_x = 0.0;
    }

    /// Turn the pending atoms into a line box: baseline at 1.25× the largest
    /// ascent, height 1.25× the largest ascent plus descent.
    fn finish_line(&mut self) {
        let metrics = self.ctx.metrics;
        let atoms = std::mem::take(&mut self.line);
        let max_ascent = atoms.iter().map(|a| metrics.ascent(&a.font)).fold(0.0, f32::max);
        let max_descent = atoms.iter().map(|a| metrics.descent(&a.font)).fold(0.0, f32::max);
        let height = if atoms.is_empty() { 0.0 } else { 1.25 * (max_ascent + max_descent) };

        let rect = Rect::new(self.area.x, self.line_y, self.area.w, height);
        let owner = self.tree.get(self.block).and_then(|b| b.node);
        let line = self.tree.alloc(LayoutBox::new(LayoutBoxKind::Line, owner, rect));
        self.tree.append_child(self.block, line);

        let baseline = self.line_y + 1.25 * max_ascent;
        for atom in atoms {
            let y = baseline - metrics.ascent(&atom.font);
            let rect = Rect::new(self.area.x + atom.x, y, atom.width, atom.height);
            let mut atom_box = LayoutBox::new(atom.kind, Some(atom.node), rect);
            if matches!(atom_box.kind, LayoutBoxKind::Input { .. }) {
                let bg = self.ctx.style(atom.node);
                if bg.background_color() != "transparent" {
                    atom_box.background = Some(bg.background_color().to_string());
                }
            }
            let id = self.tree.alloc(atom_box);
            self.tree.append_child(line, id);
        }
        self.line_y += height;
    }
}
