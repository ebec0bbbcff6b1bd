/// JavaScript evaluated by every engine before page scripts. It wraps the
/// single `call_host(name, ...args)` entry point in `console`, `document`,
/// `Node`, `Event` and `XMLHttpRequest` objects. `__dispatch(handle, type)`
/// is the hook engines use for [`ScriptEngine::dispatch_event`]; it returns
/// `[do_default, stop_propagation]`.
///
/// [`ScriptEngine::dispatch_event`]: crate::ScriptEngine::dispatch_event
pub const RUNTIME_PREAMBLE: &str = r#"
var LISTENERS = {};

var console = {
    log: function(x) { call_host("log", String(x)); }
};

function Node(handle) { this.handle = handle; }

function handleNodes(handles) {
    return handles.map(function(h) { return new Node(h); });
}

var document = {
    querySelectorAll: function(s) {
        return handleNodes(call_host("querySelectorAll", s));
    },
    createElement: function(tag) {
        return new Node(call_host("create_element", tag));
    }
};

Object.defineProperty(document, "cookie", {
    get: function() { return call_host("get_cookie"); },
    set: function(s) { call_host("set_cookie", String(s)); }
});

Node.prototype.getAttribute = function(name) {
    return call_host("getAttribute", this.handle, name);
};

Node.prototype.setAttribute = function(name, value) {
    call_host("setAttribute", this.handle, name, String(value));
};

Node.prototype.appendChild = function(child) {
    call_host("append_child", this.handle, child.handle);
    return child;
};

Node.prototype.insertBefore = function(child, ref) {
    call_host("insert_before", this.handle, child.handle, ref === null ? null : ref.handle);
    return child;
};

Object.defineProperty(Node.prototype, "innerHTML", {
    set: function(s) { call_host("innerHTML_set", this.handle, String(s)); }
});

Object.defineProperty(Node.prototype, "children", {
    get: function() { return handleNodes(call_host("get_children", this.handle)); }
});

Node.prototype.addEventListener = function(type, listener) {
    if (!LISTENERS[this.handle]) LISTENERS[this.handle] = {};
    var byType = LISTENERS[this.handle];
    if (!byType[type]) byType[type] = [];
    byType[type].push(listener);
};

Node.prototype.dispatchEvent = function(evt) {
    var list = (LISTENERS[this.handle] && LISTENERS[this.handle][evt.type]) || [];
    for (var i = 0; i < list.length; i++) {
        list[i].call(this, evt);
    }
    return [evt.do_default, evt.stop_propagation];
};

function Event(type) {
    this.type = type;
    this.do_default = true;
    this.stop_propagation = false;
}

Event.prototype.preventDefault = function() { this.do_default = false; };
Event.prototype.stopPropagation = function() { this.stop_propagation = true; };

function XMLHttpRequest() {}

XMLHttpRequest.prototype.open = function(method, url, is_async) {
    if (is_async) throw Error("Asynchronous XHR is not supported");
    this.method = method;
    this.url = url;
};

XMLHttpRequest.prototype.send = function(body) {
    this.responseText = call_host("XMLHttpRequest_send", this.method, this.url,
        body === undefined ? null : body);
};

function __dispatch(handle, type) {
    return new Node(handle).dispatchEvent(new Event(type));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostCall;

    fn host_call_names(src: &str) -> Vec<&str> {
        src.match_indices("call_host(\"")
            .filter_map(|(i, m)| src[i + m.len()..].split('"').next())
            .collect()
    }

    #[test]
    fn test_preamble_calls_are_decodable() {
        let names = host_call_names(RUNTIME_PREAMBLE);
        assert!(names.len() >= 10);
        for name in names {
            assert!(
                !matches!(HostCall::from_js(name, &[]), Err(crate::ScriptError::UnknownCall(_))),
                "preamble uses unknown host call {name}"
            );
        }
    }

    #[test]
    fn test_preamble_defines_wrappers() {
        for global in ["var console", "var document", "function Node", "function Event", "function XMLHttpRequest"] {
            assert!(RUNTIME_PREAMBLE.contains(global), "missing {global}");
        }
    }
}
