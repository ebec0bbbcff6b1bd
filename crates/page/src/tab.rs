//! One browsing context: the committed document, its script engine, scroll
//! and focus state, and the navigation history.

use std::rc::Rc;

use common::{EngineConfig, Rect};
use dom::{Dom, NodeId};
use js_dom_bindings::{DomBridge, HandleTable, Render, ScriptEngine, ScriptEngineFactory, dispatch_event};
use layout::{ApproxFontMetrics, FontMetrics, LayoutBoxKind};
use net::{
    ContentSecurityPolicy, FetchRequest, NetworkClient, ReferrerPolicy, Response, request_allowed, resolve_url,
    split_fragment,
};
use paint::{DisplayCommand, atom_label};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::forms::{form_body, is_checkbox, next_input, submit_target};
use crate::hittest::hit_test;
use crate::render::{Frame, Renderer};
use crate::ua;

// ─────────────────────────────────────────────────────────────────────────────
// Shell-facing types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Work a tab hands back to the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabRequest {
    /// Open `url` in a new tab without switching to it.
    OpenInBackground(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

enum Source {
    Inline(String),
    External(String),
}

enum ClickAction {
    Nothing,
    Navigate(String),
    Background(String),
    Submit(NodeId),
}

/// A committed page. Handles and script globals live and die with it.
struct Document {
    url: String,
    secure: bool,
    dom: Dom,
    handles: HandleTable,
    engine: Box<dyn ScriptEngine>,
    renderer: Renderer,
    csp: Option<ContentSecurityPolicy>,
    referrer_policy: ReferrerPolicy,
    focus: Option<NodeId>,
    scroll: f32,
}

impl Document {
    fn new(url: &str, response: &Response, engine: Box<dyn ScriptEngine>, renderer: Renderer) -> Self {
        let dom = html::parse(&response.body);
        let referrer_policy = response.header("referrer-policy").map(ReferrerPolicy::parse).unwrap_or_default();
        let csp = response.header("content-security-policy").and_then(ContentSecurityPolicy::parse);
        debug!(url, nodes = dom.nodes.len(), csp = csp.is_some(), "parsed document");
        Self {
            url: url.to_string(),
            secure: response.secure,
            dom,
            handles: HandleTable::new(),
            engine,
            renderer,
            csp,
            referrer_policy,
            focus: None,
            scroll: 0.0,
        }
    }

    fn script_parts<'d>(&'d mut self, net: &'d NetworkClient) -> (&'d mut Box<dyn ScriptEngine>, DomBridge<'d>) {
        let bridge = DomBridge {
            dom: &mut self.dom,
            handles: &mut self.handles,
            net,
            document_url: &self.url,
            csp: self.csp.as_ref(),
            referrer_policy: self.referrer_policy,
            renderer: &mut self.renderer,
        };
        (&mut self.engine, bridge)
    }

    fn render(&mut self) {
        self.renderer.render(&self.dom);
    }

    /// Stylesheets and scripts referenced by the page, each in document order.
    fn resources(&self) -> (Vec<Source>, Vec<Source>) {
        let mut sheets = Vec::new();
        let mut scripts = Vec::new();
        let Some(root) = self.dom.root else { return (sheets, scripts) };
        for node in self.dom.preorder(root) {
            let Some(el) = self.dom.element(node) else { continue };
            match el.tag.as_str() {
                "link" => {
                    let is_sheet = el.attr("rel").is_some_and(|r| r.eq_ignore_ascii_case("stylesheet"));
                    if let (true, Some(href)) = (is_sheet, el.attr("href")) {
                        sheets.push(Source::External(href.to_string()));
                    }
                }
                "style" => sheets.push(Source::Inline(self.dom.text_content(node))),
                "script" => match el.attr("src") {
                    Some(src) => scripts.push(Source::External(src.to_string())),
                    None => {
                        let text = self.dom.text_content(node);
                        if !text.trim().is_empty() {
                            scripts.push(Source::Inline(text));
                        }
                    }
                },
                _ => {}
            }
        }
        (sheets, scripts)
    }

    /// Body of a subresource, or `None` when it is blocked or unreachable.
    fn fetch_subresource(&self, net: &NetworkClient, href: &str) -> Option<String> {
        let url = match resolve_url(href, &self.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(href, error = %e, "unresolvable subresource");
                return None;
            }
        };
        if !request_allowed(self.csp.as_ref(), &url) {
            warn!(url, "blocked by content security policy");
            return None;
        }
        let request = FetchRequest::get(&url)
            .with_top_level(Some(&self.url))
            .with_referrer_policy(self.referrer_policy);
        match net.fetch(&request) {
            Ok(response) => Some(response.body),
            Err(e) => {
                warn!(url, error = %e, "subresource fetch failed");
                None
            }
        }
    }

    fn load_stylesheets(&mut self, net: &NetworkClient, sheets: Vec<Source>) {
        for sheet in sheets {
            let text = match sheet {
                Source::Inline(text) => text,
                Source::External(href) => match self.fetch_subresource(net, &href) {
                    Some(body) => body,
                    None => continue,
                },
            };
            self.renderer.add_rules(css::parse_stylesheet(&text).rules);
        }
        debug!(rules = self.renderer.rules().len(), "stylesheets loaded");
    }

    /// Expose every element carrying an `id` as a script global.
    fn bind_ids(&mut self) {
        let Some(root) = self.dom.root else { return };
        for node in self.dom.preorder(root) {
            if let Some(id) = self.dom.attr(node, "id") {
                let handle = self.handles.get_or_assign(node);
                self.engine.bind_node(id, handle);
            }
        }
    }

    fn run_scripts(&mut self, net: &NetworkClient, scripts: Vec<Source>) {
        for script in scripts {
            let (label, source) = match script {
                Source::Inline(text) => ("<inline>".to_string(), text),
                Source::External(src) => match self.fetch_subresource(net, &src) {
                    Some(body) => (src, body),
                    None => continue,
                },
            };
            let (engine, mut bridge) = self.script_parts(net);
            if let Err(e) = engine.eval(&source, &mut bridge) {
                warn!(script = %label, error = %e, "script crashed");
            }
        }
    }

    /// Bubble `event_type` from `node`. `true` when the default action is
    /// suppressed.
    fn dispatch(&mut self, net: &NetworkClient, event_type: &str, node: NodeId) -> bool {
        let (engine, mut bridge) = self.script_parts(net);
        match dispatch_event(&mut **engine, &mut bridge, event_type, node) {
            Ok(prevented) => prevented,
            Err(e) => {
                warn!(event = event_type, error = %e, "event listener failed");
                false
            }
        }
    }

    fn scroll_to_id(&mut self, id: &str) {
        let layout = self.renderer.layout();
        let target = layout
            .preorder()
            .into_iter()
            .filter_map(|b| layout.get(b))
            .find(|b| b.is_block() && b.node.and_then(|n| self.dom.attr(n, "id")) == Some(id));
        match target {
            Some(b) => self.scroll = b.rect.y,
            None => debug!(id, "no box for fragment"),
        }
    }

    fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.renderer.page_height() - viewport_height).max(0.0)
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.dom.element_mut(node) {
            el.set_attr("value", value);
        }
    }

    fn click(&mut self, net: &NetworkClient, x: f32, y: f32, button: MouseButton) -> Result<ClickAction, LoadError> {
        self.focus = None;
        let Some(hit) = hit_test(self.renderer.layout(), x, y) else { return Ok(ClickAction::Nothing) };
        let mut current = Some(hit);
        while let Some(node) = current {
            let tag = self.dom.tag(node).map(str::to_string);
            match tag.as_deref() {
                Some("input") => {
                    if !self.dispatch(net, "click", node) {
                        if is_checkbox(&self.dom, node) {
                            if let Some(el) = self.dom.element_mut(node) {
                                if el.remove_attr("checked").is_none() {
                                    el.set_attr("checked", "");
                                }
                            }
                        } else {
                            self.focus = Some(node);
                            self.set_value(node, "");
                        }
                    }
                    self.render();
                    return Ok(ClickAction::Nothing);
                }
                Some("button") => {
                    if self.dispatch(net, "click", node) {
                        return Ok(ClickAction::Nothing);
                    }
                    return Ok(submit_target(&self.dom, node).map_or(ClickAction::Nothing, ClickAction::Submit));
                }
                Some("a") => {
                    if let Some(href) = self.dom.attr(node, "href").map(str::to_string) {
                        if self.dispatch(net, "click", node) {
                            return Ok(ClickAction::Nothing);
                        }
                        return self.follow_link(&href, button);
                    }
                }
                _ => {}
            }
            current = self.dom.parent(node);
        }
        Ok(ClickAction::Nothing)
    }

    fn follow_link(&mut self, href: &str, button: MouseButton) -> Result<ClickAction, LoadError> {
        if let Some(fragment) = href.strip_prefix('#') {
            self.scroll_to_id(fragment);
            let (base, _) = split_fragment(&self.url);
            self.url = format!("{base}#{fragment}");
            return Ok(ClickAction::Nothing);
        }
        let url = resolve_url(href, &self.url).map_err(|source| LoadError::Resolve { href: href.to_string(), source })?;
        Ok(match button {
            MouseButton::Middle => ClickAction::Background(url),
            _ => ClickAction::Navigate(url),
        })
    }

    /// The page's display list plus a caret after the focused input's text.
    fn frame(&self) -> Frame {
        let mut display_list = self.renderer.display_list().clone();
        if let Some(caret) = self.caret() {
            display_list.push(caret);
        }
        Frame { display_list, page_height: self.renderer.page_height(), scroll: self.scroll }
    }

    fn caret(&self) -> Option<DisplayCommand> {
        let focus = self.focus?;
        let input = self.renderer.layout().input_for_node(focus)?;
        let LayoutBoxKind::Input { font, color } = &input.kind else { return None };
        let text = atom_label(&self.dom, focus);
        let x = input.rect.x + self.renderer.metrics().measure(font, &text);
        Some(DisplayCommand::DrawRect { rect: Rect::new(x, input.rect.y, 1.0, input.rect.h), color: color.clone() })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab
// ─────────────────────────────────────────────────────────────────────────────

/// Page controller for one tab.
///
/// `load` runs the whole pipeline (fetch, parse, stylesheets, scripts,
/// style, layout, paint) before the new document is committed; a failed
/// load leaves the previous one in place. Coordinates passed to [`click`]
/// are relative to the top of the viewport.
///
/// [`click`]: Tab::click
pub struct Tab {
    net: NetworkClient,
    engines: Box<dyn ScriptEngineFactory>,
    config: EngineConfig,
    metrics: Rc<dyn FontMetrics>,
    document: Option<Document>,
    history: Vec<String>,
}

impl Tab {
    pub fn new(net: NetworkClient, engines: Box<dyn ScriptEngineFactory>, config: EngineConfig) -> Self {
        Self { net, engines, config, metrics: Rc::new(ApproxFontMetrics), document: None, history: Vec::new() }
    }

    pub fn with_metrics(mut self, metrics: Rc<dyn FontMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn load(&mut self, url: &str, payload: Option<&str>) -> Result<(), LoadError> {
        info!(url, post = payload.is_some(), "navigating");
        let (address, fragment) = split_fragment(url);
        let previous_url = self.document.as_ref().map(|d| d.url.as_str());
        let policy = self.document.as_ref().map(|d| d.referrer_policy).unwrap_or_default();
        let request = match payload {
            Some(body) => FetchRequest::post(address, body),
            None => FetchRequest::get(address),
        }
        .with_top_level(previous_url)
        .with_referrer_policy(policy);
        let response = self.net.fetch(&request).map_err(|source| LoadError::Fetch { url: url.to_string(), source })?;

        let renderer = Renderer::new(ua::default_rules(), self.config.clone(), self.metrics.clone());
        let mut doc = Document::new(url, &response, self.engines.create(), renderer);
        let (sheets, scripts) = doc.resources();
        doc.load_stylesheets(&self.net, sheets);
        doc.bind_ids();
        doc.run_scripts(&self.net, scripts);
        doc.render();
        if let Some(fragment) = fragment {
            doc.scroll_to_id(fragment);
        }

        self.history.push(url.to_string());
        self.document = Some(doc);
        Ok(())
    }

    /// Snapshot of the current document for painting. Empty before the
    /// first successful load.
    pub fn render(&self) -> Frame {
        self.document.as_ref().map(Document::frame).unwrap_or_default()
    }

    pub fn click(&mut self, x: f32, y: f32, button: MouseButton) -> Result<Option<TabRequest>, LoadError> {
        let Some(doc) = self.document.as_mut() else { return Ok(None) };
        let page_y = y + doc.scroll;
        let action = doc.click(&self.net, x, page_y, button)?;
        match action {
            ClickAction::Nothing => Ok(None),
            ClickAction::Navigate(url) => self.load(&url, None).map(|()| None),
            ClickAction::Background(url) => Ok(Some(TabRequest::OpenInBackground(url))),
            ClickAction::Submit(form) => self.submit_form(form).map(|()| None),
        }
    }

    /// Type `c` into the focused input.
    pub fn key_press(&mut self, c: char) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(focus) = doc.focus else { return };
        if doc.dispatch(&self.net, "keydown", focus) {
            return;
        }
        let mut value = doc.dom.attr(focus, "value").unwrap_or("").to_string();
        value.push(c);
        doc.set_value(focus, &value);
        doc.render();
    }

    /// Scroll by `delta` pixels (positive is down), clamped to the page.
    pub fn scroll_by(&mut self, delta: f32) {
        let height = self.config.viewport_height;
        let Some(doc) = self.document.as_mut() else { return };
        doc.scroll = (doc.scroll + delta).clamp(0.0, doc.max_scroll(height));
    }

    pub fn scroll_down(&mut self) {
        self.scroll_by(self.config.scroll_step);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_by(-self.config.scroll_step);
    }

    /// Submit the form enclosing the focused input.
    pub fn enter(&mut self) -> Result<(), LoadError> {
        let target = self
            .document
            .as_ref()
            .and_then(|doc| doc.focus.and_then(|focus| submit_target(&doc.dom, focus)));
        match target {
            Some(form) => self.submit_form(form),
            None => Ok(()),
        }
    }

    /// Move focus to the next input and clear it.
    pub fn tab_cycle(&mut self) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(next) = doc.focus.and_then(|focus| next_input(&doc.dom, focus)) else { return };
        doc.focus = Some(next);
        doc.set_value(next, "");
        doc.render();
    }

    pub fn go_back(&mut self) -> Result<(), LoadError> {
        if self.history.len() < 2 {
            return Ok(());
        }
        let saved = self.history.clone();
        self.history.truncate(saved.len() - 2);
        let back = &saved[saved.len() - 2];
        match self.load(back, None) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.history = saved;
                Err(e)
            }
        }
    }

    fn submit_form(&mut self, form: NodeId) -> Result<(), LoadError> {
        let Some(doc) = self.document.as_mut() else { return Ok(()) };
        if doc.dispatch(&self.net, "submit", form) {
            return Ok(());
        }
        let body = form_body(&doc.dom, form);
        let action = doc.dom.attr(form, "action").unwrap_or("").to_string();
        let is_post = doc.dom.attr(form, "method").is_some_and(|m| m.eq_ignore_ascii_case("post"));
        let url = resolve_url(&action, &doc.url).map_err(|source| LoadError::Resolve { href: action.clone(), source })?;
        debug!(url, post = is_post, "submitting form");
        if is_post {
            self.load(&url, Some(&body))
        } else {
            self.load(&format!("{url}?{body}"), None)
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.url.as_str())
    }

    /// Whether the committed page arrived over TLS.
    pub fn is_secure(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.secure)
    }

    pub fn scroll(&self) -> f32 {
        self.document.as_ref().map_or(0.0, |d| d.scroll)
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.document.as_ref().and_then(|d| d.focus)
    }

    pub fn dom(&self) -> Option<&Dom> {
        self.document.as_ref().map(|d| &d.dom)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn net(&self) -> &NetworkClient {
        &self.net
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
