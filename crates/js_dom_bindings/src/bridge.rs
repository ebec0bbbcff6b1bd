//! [`DomBridge`]: the [`ScriptHost`] backed by a live document.

use dom::{Dom, NodeId};
use net::{ContentSecurityPolicy, FetchRequest, NetworkClient, ReferrerPolicy, request_allowed, resolve_url, url_origin};
use tracing::{debug, info, warn};

use crate::engine::ScriptEngine;
use crate::error::ScriptError;
use crate::handles::{Handle, HandleTable};
use crate::host::{IdBindings, ScriptHost};

/// Re-style and re-lay-out the page after a mutation.
pub trait Render {
    fn render(&mut self, dom: &Dom);
}

/// Borrowed view of one page, valid for a single script entry.
pub struct DomBridge<'a> {
    pub dom: &'a mut Dom,
    pub handles: &'a mut HandleTable,
    pub net: &'a NetworkClient,
    pub document_url: &'a str,
    pub csp: Option<&'a ContentSecurityPolicy>,
    pub referrer_policy: ReferrerPolicy,
    pub renderer: &'a mut dyn Render,
}

impl DomBridge<'_> {
    pub fn handle_for(&mut self, node: NodeId) -> Handle {
        self.handles.get_or_assign(node)
    }

    fn node(&self, handle: Handle) -> Result<NodeId, ScriptError> {
        self.handles
            .node(handle)
            .filter(|&id| self.dom.node(id).is_some())
            .ok_or(ScriptError::InvalidHandle(handle))
    }

    fn render(&mut self) {
        self.renderer.render(self.dom);
    }

    /// Elements carrying an `id` in the subtree at `start`, pre-order.
    fn ids_in(&self, start: NodeId) -> Vec<(String, NodeId)> {
        self.dom
            .preorder(start)
            .into_iter()
            .filter_map(|n| self.dom.attr(n, "id").map(|id| (id.to_string(), n)))
            .collect()
    }
}

impl ScriptHost for DomBridge<'_> {
    fn log(&mut self, message: &str) {
        info!(target: "console", "{message}");
    }

    fn query_selector_all(&mut self, selector: &str) -> Result<Vec<Handle>, ScriptError> {
        let parsed = css::parse_selector(selector).ok_or_else(|| ScriptError::InvalidSelector(selector.to_string()))?;
        let dom: &Dom = self.dom;
        let Some(root) = dom.root else { return Ok(Vec::new()) };
        let matches: Vec<NodeId> = dom.preorder(root).into_iter().filter(|&n| parsed.matches(dom, n)).collect();
        Ok(matches.into_iter().map(|n| self.handle_for(n)).collect())
    }

    fn get_attribute(&mut self, node: Handle, name: &str) -> Result<Option<String>, ScriptError> {
        let id = self.node(node)?;
        Ok(self.dom.attr(id, name).map(str::to_string))
    }

    fn set_attribute(&mut self, node: Handle, name: &str, value: &str) -> Result<(), ScriptError> {
        let id = self.node(node)?;
        let element = self.dom.element_mut(id).ok_or(ScriptError::InvalidHandle(node))?;
        element.set_attr(name, value);
        self.render();
        Ok(())
    }

    fn children(&mut self, node: Handle) -> Result<Vec<Handle>, ScriptError> {
        let id = self.node(node)?;
        let elements: Vec<NodeId> =
            self.dom.children(id).iter().copied().filter(|&c| self.dom.element(c).is_some()).collect();
        Ok(elements.into_iter().map(|c| self.handle_for(c)).collect())
    }

    fn create_element(&mut self, tag: &str) -> Handle {
        let id = self.dom.create_element(tag, Vec::new());
        self.handle_for(id)
    }

    fn append_child(&mut self, parent: Handle, child: Handle) -> Result<(), ScriptError> {
        let (p, c) = (self.node(parent)?, self.node(child)?);
        if !self.dom.append_child(p, c) {
            return Err(ScriptError::HierarchyRequest { parent, child });
        }
        self.render();
        Ok(())
    }

    fn insert_before(&mut self, parent: Handle, child: Handle, reference: Option<Handle>) -> Result<(), ScriptError> {
        let (p, c) = (self.node(parent)?, self.node(child)?);
        let r = reference.map(|h| self.node(h)).transpose()?;
        if !self.dom.insert_before(p, c, r) {
            return Err(ScriptError::HierarchyRequest { parent, child });
        }
        self.render();
        Ok(())
    }

    fn set_inner_html(&mut self, node: Handle, markup: &str) -> Result<IdBindings, ScriptError> {
        let target = self.node(node)?;
        let fragment = html::parse_into(self.dom, &format!("<html><body>{markup}</body></html>"));
        let body = self.dom.children(fragment).iter().copied().find(|&c| self.dom.tag(c) == Some("body"));
        let new_children = body.map(|b| self.dom.children(b).to_vec()).unwrap_or_default();

        let mut bindings = IdBindings::default();
        for old in self.dom.children(target).to_vec() {
            bindings.removed.extend(self.ids_in(old).into_iter().map(|(name, _)| name));
            self.dom.detach(old);
        }
        for child in new_children {
            self.dom.append_child(target, child);
            for (name, id) in self.ids_in(child) {
                let handle = self.handle_for(id);
                bindings.added.push((name, handle));
            }
        }
        self.dom.remove_subtree(fragment);
        debug!(removed = bindings.removed.len(), added = bindings.added.len(), "innerHTML replaced");
        self.render();
        Ok(bindings)
    }

    fn cookie(&mut self) -> String {
        self.net.script_cookie(self.document_url)
    }

    fn set_cookie(&mut self, text: &str) -> bool {
        self.net.set_script_cookie(self.document_url, text)
    }

    fn xhr_send(&mut self, method: &str, url: &str, body: Option<&str>) -> Result<String, ScriptError> {
        let full_url = resolve_url(url, self.document_url)?;
        if !request_allowed(self.csp, &full_url) {
            warn!(url = %full_url, "XHR blocked by CSP");
            return Err(ScriptError::BlockedByCsp(full_url));
        }
        if url_origin(&full_url) != url_origin(self.document_url) {
            return Err(ScriptError::CrossOrigin(full_url));
        }
        let payload = match body {
            Some(b) => Some(b.to_string()),
            None if method.eq_ignore_ascii_case("POST") => Some(String::new()),
            None => None,
        };
        debug!(%method, url = %full_url, "XHR");
        let request = FetchRequest {
            url: full_url,
            top_level_url: Some(self.document_url.to_string()),
            payload,
            headers: Vec::new(),
            referrer_policy: self.referrer_policy,
        };
        Ok(self.net.fetch(&request)?.body)
    }
}

/// Bubble `event_type` from `target` to the root. Returns `true` when some
/// listener called `preventDefault`, so the caller skips its default action.
pub fn dispatch_event(
    engine: &mut dyn ScriptEngine,
    host: &mut DomBridge<'_>,
    event_type: &str,
    target: NodeId,
) -> Result<bool, ScriptError> {
    let mut prevented = false;
    let mut current = Some(target);
    while let Some(node) = current {
        // Only nodes script has seen can carry listeners.
        if let Some(handle) = host.handles.get(node) {
            let outcome = engine.dispatch_event(handle, event_type, host)?;
            prevented |= outcome.prevent_default;
            if outcome.stop_propagation {
                break;
            }
        }
        current = host.dom.parent(node);
    }
    Ok(prevented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EventOutcome;
    use net::{MemoryTransport, NetConfig};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountRenders(usize);

    impl Render for CountRenders {
        fn render(&mut self, _dom: &Dom) {
            self.0 += 1;
        }
    }

    struct Page {
        dom: Dom,
        handles: HandleTable,
        net: NetworkClient,
        transport: Rc<MemoryTransport>,
        renders: CountRenders,
        csp: Option<ContentSecurityPolicy>,
    }

    const URL: &str = "http://site.test/dir/page.html";

    impl Page {
        fn new(markup: &str) -> Self {
            let transport = Rc::new(MemoryTransport::new());
            Self {
                dom: html::parse(markup),
                handles: HandleTable::new(),
                net: NetworkClient::new(transport.clone(), NetConfig::default()),
                transport,
                renders: CountRenders::default(),
                csp: None,
            }
        }

        fn bridge(&mut self) -> DomBridge<'_> {
            DomBridge {
                dom: &mut self.dom,
                handles: &mut self.handles,
                net: &self.net,
                document_url: URL,
                csp: self.csp.as_ref(),
                referrer_policy: ReferrerPolicy::default(),
                renderer: &mut self.renders,
            }
        }
    }

    #[test]
    fn test_query_selector_all_preorder() {
        let mut page = Page::new("<div class=a><p class=a>x</p></div><p>y</p>");
        let mut bridge = page.bridge();
        let all_p = bridge.query_selector_all("p").unwrap();
        assert_eq!(all_p, vec![0, 1]);
        let a = bridge.query_selector_all(".a").unwrap();
        assert_eq!(a, vec![2, 0]);
        assert_eq!(bridge.query_selector_all("div p").unwrap(), vec![0]);
        assert!(matches!(bridge.query_selector_all("{"), Err(ScriptError::InvalidSelector(_))));
    }

    #[test]
    fn test_attributes() {
        let mut page = Page::new("<a href=/x>link</a>");
        let mut bridge = page.bridge();
        let a = bridge.query_selector_all("a").unwrap()[0];
        assert_eq!(bridge.get_attribute(a, "HREF").unwrap().as_deref(), Some("/x"));
        assert_eq!(bridge.get_attribute(a, "title").unwrap(), None);
        bridge.set_attribute(a, "title", "t").unwrap();
        assert_eq!(bridge.get_attribute(a, "title").unwrap().as_deref(), Some("t"));
        assert!(matches!(bridge.get_attribute(99, "x"), Err(ScriptError::InvalidHandle(99))));
        drop(bridge);
        assert_eq!(page.renders.0, 1);
    }

    #[test]
    fn test_children_are_elements_only() {
        let mut page = Page::new("<div>text<b>1</b>more<i>2</i></div>");
        let mut bridge = page.bridge();
        let div = bridge.query_selector_all("div").unwrap()[0];
        let kids = bridge.children(div).unwrap();
        assert_eq!(kids.len(), 2);
        let tags: Vec<_> = kids.iter().map(|&h| bridge.dom.tag(bridge.handles.node(h).unwrap()).unwrap()).collect();
        assert_eq!(tags, ["b", "i"]);
    }

    #[test]
    fn test_create_append_insert_render_each_time() {
        let mut page = Page::new("<ul><li>a</li></ul>");
        let mut bridge = page.bridge();
        let ul = bridge.query_selector_all("ul").unwrap()[0];
        let first = bridge.children(ul).unwrap()[0];

        let last = bridge.create_element("LI");
        assert_eq!(bridge.dom.parent(bridge.handles.node(last).unwrap()), None);
        bridge.append_child(ul, last).unwrap();
        let head = bridge.create_element("li");
        bridge.insert_before(ul, head, Some(first)).unwrap();
        let tail = bridge.create_element("li");
        bridge.insert_before(ul, tail, None).unwrap();

        assert_eq!(bridge.children(ul).unwrap(), vec![head, first, last, tail]);
        let ul_id = bridge.handles.node(ul).unwrap();
        assert_eq!(bridge.dom.parent(bridge.handles.node(head).unwrap()), Some(ul_id));
        drop(bridge);
        assert_eq!(page.renders.0, 3);
    }

    #[test]
    fn test_append_ancestor_into_descendant_is_rejected() {
        let mut page = Page::new("<div><p>x</p></div>");
        let mut bridge = page.bridge();
        let div = bridge.query_selector_all("div").unwrap()[0];
        let p = bridge.query_selector_all("p").unwrap()[0];
        let root = bridge.dom.root.unwrap();
        let html = bridge.handle_for(root);

        assert!(matches!(bridge.append_child(p, html), Err(ScriptError::HierarchyRequest { .. })));
        assert!(matches!(bridge.insert_before(p, div, None), Err(ScriptError::HierarchyRequest { .. })));
        assert!(matches!(bridge.append_child(div, div), Err(ScriptError::HierarchyRequest { .. })));

        let (div_id, p_id) = (bridge.handles.node(div).unwrap(), bridge.handles.node(p).unwrap());
        assert_eq!(bridge.dom.parent(root), None);
        assert_eq!(bridge.dom.parent(p_id), Some(div_id));
        assert_eq!(bridge.dom.ancestors(p_id).last(), Some(&root));
        drop(bridge);
        assert_eq!(page.renders.0, 0);
    }

    #[test]
    fn test_inner_html_replaces_children_and_ids() {
        let mut page = Page::new("<div id=box><span id=old>x</span></div>");
        let mut bridge = page.bridge();
        let div = bridge.query_selector_all("div").unwrap()[0];
        let old = bridge.children(div).unwrap()[0];

        let change = bridge.set_inner_html(div, "<b id=fresh>new</b> tail <i>z</i>").unwrap();
        assert_eq!(change.removed, vec!["old".to_string()]);
        assert_eq!(change.added.len(), 1);
        assert_eq!(change.added[0].0, "fresh");

        let div_id = bridge.handles.node(div).unwrap();
        let kids = bridge.dom.children(div_id).to_vec();
        assert_eq!(kids.len(), 3);
        for &k in &kids {
            assert_eq!(bridge.dom.parent(k), Some(div_id));
        }
        assert_eq!(bridge.dom.text_content(div_id), "new tail z");
        let fresh = bridge.handles.node(change.added[0].1).unwrap();
        assert_eq!(bridge.dom.attr(fresh, "id"), Some("fresh"));
        // Detached nodes stay addressable.
        assert!(bridge.get_attribute(old, "id").unwrap().is_some());
        drop(bridge);
        assert_eq!(page.renders.0, 1);
    }

    #[test]
    fn test_cookie_access_scoped_to_document_host() {
        let mut page = Page::new("");
        page.transport.route_ok("http://site.test/", &[("Set-Cookie", "s=1; HttpOnly")], "");
        page.net.fetch(&FetchRequest::get("http://site.test/")).unwrap();
        let mut bridge = page.bridge();
        assert_eq!(bridge.cookie(), "");
        assert!(!bridge.set_cookie("s=2"));

        let mut page = Page::new("");
        let mut bridge = page.bridge();
        assert!(bridge.set_cookie("theme=dark"));
        assert_eq!(bridge.cookie(), "theme=dark");
    }

    #[test]
    fn test_xhr_same_origin() {
        let mut page = Page::new("");
        page.transport.route_ok("http://site.test/dir/data", &[], "payload");
        page.transport.route_ok("http://site.test/post", &[], "stored");
        let mut bridge = page.bridge();
        assert_eq!(bridge.xhr_send("GET", "data", None).unwrap(), "payload");
        assert_eq!(bridge.xhr_send("POST", "/post", Some("a=1")).unwrap(), "stored");
        drop(bridge);
        let sent = page.transport.requests();
        assert!(sent[1].starts_with("POST /post HTTP/1.1"));
        assert!(sent[1].contains(&format!("Referer: {URL}")));
    }

    #[test]
    fn test_xhr_refusals() {
        let mut page = Page::new("");
        let mut bridge = page.bridge();
        assert!(matches!(
            bridge.xhr_send("GET", "http://other.test/x", None),
            Err(ScriptError::CrossOrigin(_))
        ));

        let mut page = Page::new("");
        page.csp = ContentSecurityPolicy::parse("default-src http://cdn.test");
        let mut bridge = page.bridge();
        assert!(matches!(bridge.xhr_send("GET", "/x", None), Err(ScriptError::BlockedByCsp(_))));
        drop(bridge);
        assert_eq!(page.transport.request_count(), 0);
    }

    #[test]
    fn test_xhr_network_failure() {
        let mut page = Page::new("");
        page.transport.route("http://site.test/gone", "HTTP/1.1 500 Oops\r\n\r\n");
        let mut bridge = page.bridge();
        assert!(matches!(bridge.xhr_send("GET", "/gone", None), Err(ScriptError::Network(_))));
    }

    /// Listener outcomes keyed by (handle, type); records visit order.
    #[derive(Default)]
    struct Listeners {
        outcomes: HashMap<Handle, EventOutcome>,
        visited: Vec<Handle>,
    }

    impl ScriptEngine for Listeners {
        fn eval(&mut self, _: &str, _: &mut dyn ScriptHost) -> Result<(), ScriptError> {
            Ok(())
        }

        fn dispatch_event(&mut self, handle: Handle, _: &str, _: &mut dyn ScriptHost) -> Result<EventOutcome, ScriptError> {
            self.visited.push(handle);
            Ok(self.outcomes.get(&handle).copied().unwrap_or_default())
        }

        fn bind_node(&mut self, _: &str, _: Handle) {}

        fn unbind(&mut self, _: &str) {}
    }

    #[test]
    fn test_event_bubbles_to_root() {
        let mut page = Page::new("<form><p><button>go</button></p></form>");
        let mut bridge = page.bridge();
        let form = bridge.query_selector_all("form").unwrap()[0];
        let button = bridge.query_selector_all("button").unwrap()[0];
        let mut engine = Listeners::default();
        engine.outcomes.insert(form, EventOutcome { prevent_default: true, stop_propagation: false });

        let target = bridge.handles.node(button).unwrap();
        assert!(dispatch_event(&mut engine, &mut bridge, "click", target).unwrap());
        // p, body and html never crossed to script.
        assert_eq!(engine.visited, vec![button, form]);
    }

    #[test]
    fn test_stop_propagation() {
        let mut page = Page::new("<div><a href=x>go</a></div>");
        let mut bridge = page.bridge();
        let div = bridge.query_selector_all("div").unwrap()[0];
        let a = bridge.query_selector_all("a").unwrap()[0];
        let mut engine = Listeners::default();
        engine.outcomes.insert(a, EventOutcome { prevent_default: false, stop_propagation: true });
        engine.outcomes.insert(div, EventOutcome { prevent_default: true, stop_propagation: false });

        let target = bridge.handles.node(a).unwrap();
        assert!(!dispatch_event(&mut engine, &mut bridge, "click", target).unwrap());
        assert_eq!(engine.visited, vec![a]);
    }

    #[test]
    fn test_call_routes_through_host() {
        use crate::host::{HostCall, HostValue};
        let mut page = Page::new("<p>x</p>");
        let mut bridge = page.bridge();
        let value = bridge.call(HostCall::QuerySelectorAll("p".into())).unwrap();
        assert_eq!(value, HostValue::Handles(vec![0]));
        let value = bridge.call(HostCall::GetAttribute { node: 0, name: "id".into() }).unwrap();
        assert!(value.is_null());
    }
}
