//! The host-function surface scripts call into.
//!
//! Engines route every `call_host(name, ...args)` from the runtime preamble
//! through [`HostCall::from_js`] and [`ScriptHost::call`].

use crate::error::ScriptError;
use crate::handles::Handle;

// ─────────────────────────────────────────────────────────────────────────────
// IdBindings
// ─────────────────────────────────────────────────────────────────────────────

/// Global `id` names to drop and to (re)bind after a subtree was replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdBindings {
    pub removed: Vec<String>,
    pub added: Vec<(String, Handle)>,
}

impl IdBindings {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HostCall
// ─────────────────────────────────────────────────────────────────────────────

/// One call from script into the host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    /// `console.log(message)`
    Log(String),
    /// `document.querySelectorAll(selector)`
    QuerySelectorAll(String),
    /// `node.getAttribute(name)`
    GetAttribute { node: Handle, name: String },
    /// `node.setAttribute(name, value)`
    SetAttribute { node: Handle, name: String, value: String },
    /// `node.children`
    GetChildren(Handle),
    /// `document.createElement(tag)`
    CreateElement(String),
    /// `parent.appendChild(child)`
    AppendChild { parent: Handle, child: Handle },
    /// `parent.insertBefore(child, reference)`
    InsertBefore { parent: Handle, child: Handle, reference: Option<Handle> },
    /// `node.innerHTML = markup`
    SetInnerHtml { node: Handle, markup: String },
    /// `document.cookie`
    GetCookie,
    /// `document.cookie = text`
    SetCookie(String),
    /// `xhr.send(body)` after `xhr.open(method, url)`
    XhrSend { method: String, url: String, body: Option<String> },
}

impl HostCall {
    /// Decode a `call_host` invocation by the name the preamble uses.
    pub fn from_js(name: &str, args: &[HostValue]) -> Result<Self, ScriptError> {
        let args = Args { call: name, values: args };
        Ok(match name {
            "log" => HostCall::Log(args.text_or_empty(0)),
            "querySelectorAll" => HostCall::QuerySelectorAll(args.text(0)?),
            "getAttribute" => HostCall::GetAttribute { node: args.handle(0)?, name: args.text(1)? },
            "setAttribute" => HostCall::SetAttribute {
                node: args.handle(0)?,
                name: args.text(1)?,
                value: args.text_or_empty(2),
            },
            "get_children" => HostCall::GetChildren(args.handle(0)?),
            "create_element" => HostCall::CreateElement(args.text(0)?),
            "append_child" => HostCall::AppendChild { parent: args.handle(0)?, child: args.handle(1)? },
            "insert_before" => HostCall::InsertBefore {
                parent: args.handle(0)?,
                child: args.handle(1)?,
                reference: args.optional_handle(2)?,
            },
            "innerHTML_set" => HostCall::SetInnerHtml { node: args.handle(0)?, markup: args.text_or_empty(1) },
            "get_cookie" => HostCall::GetCookie,
            "set_cookie" => HostCall::SetCookie(args.text_or_empty(0)),
            "XMLHttpRequest_send" => HostCall::XhrSend {
                method: args.text(0)?,
                url: args.text(1)?,
                body: args.optional_text(2),
            },
            other => return Err(ScriptError::UnknownCall(other.to_string())),
        })
    }

    /// Calls that change the tree and therefore re-render.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            HostCall::SetAttribute { .. }
                | HostCall::AppendChild { .. }
                | HostCall::InsertBefore { .. }
                | HostCall::SetInnerHtml { .. }
        )
    }
}

struct Args<'a> {
    call: &'a str,
    values: &'a [HostValue],
}

impl Args<'_> {
    fn bad(&self, index: usize) -> ScriptError {
        ScriptError::BadArgument { call: self.call.to_string(), index }
    }

    fn text(&self, index: usize) -> Result<String, ScriptError> {
        self.optional_text(index).ok_or_else(|| self.bad(index))
    }

    fn text_or_empty(&self, index: usize) -> String {
        self.optional_text(index).unwrap_or_default()
    }

    fn optional_text(&self, index: usize) -> Option<String> {
        match self.values.get(index)? {
            HostValue::Null => None,
            HostValue::Text(s) => Some(s.clone()),
            HostValue::Number(n) => Some(n.to_string()),
            HostValue::Bool(b) => Some(b.to_string()),
            HostValue::Handle(h) => Some(h.to_string()),
            HostValue::Handles(_) | HostValue::Bindings(_) => None,
        }
    }

    fn handle(&self, index: usize) -> Result<Handle, ScriptError> {
        self.optional_handle(index)?.ok_or_else(|| self.bad(index))
    }

    fn optional_handle(&self, index: usize) -> Result<Option<Handle>, ScriptError> {
        match self.values.get(index) {
            None | Some(HostValue::Null) => Ok(None),
            Some(v) => v.as_handle().map(Some).ok_or_else(|| self.bad(index)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HostValue
// ─────────────────────────────────────────────────────────────────────────────

/// Values crossing the host boundary in either direction.
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Handle(Handle),
    Handles(Vec<Handle>),
    /// Returned by `innerHTML_set`; the engine applies it to its globals.
    Bindings(IdBindings),
}

impl HostValue {
    /// A handle, accepting integral non-negative numbers as JS passes them.
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            HostValue::Handle(h) => Some(*h),
            HostValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as Handle),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HostValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handles(&self) -> Option<&[Handle]> {
        match self {
            HostValue::Handles(list) => Some(list),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }
}

impl From<Option<String>> for HostValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(HostValue::Null, HostValue::Text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScriptHost
// ─────────────────────────────────────────────────────────────────────────────

/// Host functions available to scripts. Every mutating operation re-renders
/// the page before returning.
pub trait ScriptHost {
    fn log(&mut self, message: &str);
    fn query_selector_all(&mut self, selector: &str) -> Result<Vec<Handle>, ScriptError>;
    fn get_attribute(&mut self, node: Handle, name: &str) -> Result<Option<String>, ScriptError>;
    fn set_attribute(&mut self, node: Handle, name: &str, value: &str) -> Result<(), ScriptError>;
    /// Element children only.
    fn children(&mut self, node: Handle) -> Result<Vec<Handle>, ScriptError>;
    /// A new, detached element.
    fn create_element(&mut self, tag: &str) -> Handle;
    fn append_child(&mut self, parent: Handle, child: Handle) -> Result<(), ScriptError>;
    /// Appends when `reference` is `None`.
    fn insert_before(&mut self, parent: Handle, child: Handle, reference: Option<Handle>) -> Result<(), ScriptError>;
    fn set_inner_html(&mut self, node: Handle, markup: &str) -> Result<IdBindings, ScriptError>;
    fn cookie(&mut self) -> String;
    /// `false` when the write was refused.
    fn set_cookie(&mut self, text: &str) -> bool;
    fn xhr_send(&mut self, method: &str, url: &str, body: Option<&str>) -> Result<String, ScriptError>;

    /// Run a decoded call.
    fn call(&mut self, call: HostCall) -> Result<HostValue, ScriptError> {
        Ok(match call {
            HostCall::Log(message) => {
                self.log(&message);
                HostValue::Null
            }
            HostCall::QuerySelectorAll(selector) => HostValue::Handles(self.query_selector_all(&selector)?),
            HostCall::GetAttribute { node, name } => self.get_attribute(node, &name)?.into(),
            HostCall::SetAttribute { node, name, value } => {
                self.set_attribute(node, &name, &value)?;
                HostValue::Null
            }
            HostCall::GetChildren(node) => HostValue::Handles(self.children(node)?),
            HostCall::CreateElement(tag) => HostValue::Handle(self.create_element(&tag)),
            HostCall::AppendChild { parent, child } => {
                self.append_child(parent, child)?;
                HostValue::Handle(child)
            }
            HostCall::InsertBefore { parent, child, reference } => {
                self.insert_before(parent, child, reference)?;
                HostValue::Handle(child)
            }
            HostCall::SetInnerHtml { node, markup } => HostValue::Bindings(self.set_inner_html(node, &markup)?),
            HostCall::GetCookie => HostValue::Text(self.cookie()),
            HostCall::SetCookie(text) => HostValue::Bool(self.set_cookie(&text)),
            HostCall::XhrSend { method, url, body } => HostValue::Text(self.xhr_send(&method, &url, body.as_deref())?),
        })
    }
}
