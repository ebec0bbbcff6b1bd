//! The seam to an external script interpreter.

use tracing::debug;

use crate::error::ScriptError;
use crate::handles::Handle;
use crate::host::{IdBindings, ScriptHost};

/// What listeners asked for while handling one event at one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// A script interpreter bound to one document. Implementations evaluate
/// [`RUNTIME_PREAMBLE`](crate::RUNTIME_PREAMBLE) before any page script and
/// apply the [`IdBindings`] returned by `innerHTML_set` to their globals.
pub trait ScriptEngine {
    fn eval(&mut self, source: &str, host: &mut dyn ScriptHost) -> Result<(), ScriptError>;

    /// Run the listeners registered for `event_type` on `handle` only.
    fn dispatch_event(
        &mut self,
        handle: Handle,
        event_type: &str,
        host: &mut dyn ScriptHost,
    ) -> Result<EventOutcome, ScriptError>;

    /// Define the global `name` as the node wrapper for `handle`.
    fn bind_node(&mut self, name: &str, handle: Handle);

    fn unbind(&mut self, name: &str);

    fn apply_bindings(&mut self, bindings: &IdBindings) {
        for name in &bindings.removed {
            self.unbind(name);
        }
        for (name, handle) in &bindings.added {
            self.bind_node(name, *handle);
        }
    }
}

/// Builds a fresh engine for every document.
pub trait ScriptEngineFactory {
    fn create(&self) -> Box<dyn ScriptEngine>;
}

impl<F> ScriptEngineFactory for F
where
    F: Fn() -> Box<dyn ScriptEngine>,
{
    fn create(&self) -> Box<dyn ScriptEngine> {
        self()
    }
}

/// Accepts every script and runs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScriptEngine;

impl ScriptEngine for NullScriptEngine {
    fn eval(&mut self, source: &str, _host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        debug!(bytes = source.len(), "no script engine; skipping");
        Ok(())
    }

    fn dispatch_event(
        &mut self,
        _handle: Handle,
        _event_type: &str,
        _host: &mut dyn ScriptHost,
    ) -> Result<EventOutcome, ScriptError> {
        Ok(EventOutcome::default())
    }

    fn bind_node(&mut self, _name: &str, _handle: Handle) {}

    fn unbind(&mut self, _name: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngineFactory;

impl ScriptEngineFactory for NullEngineFactory {
    fn create(&self) -> Box<dyn ScriptEngine> {
        Box::new(NullScriptEngine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Globals {
        names: Vec<(String, Handle)>,
    }

    impl ScriptEngine for Globals {
        fn eval(&mut self, _: &str, _: &mut dyn ScriptHost) -> Result<(), ScriptError> {
            Ok(())
        }

        fn dispatch_event(&mut self, _: Handle, _: &str, _: &mut dyn ScriptHost) -> Result<EventOutcome, ScriptError> {
            Ok(EventOutcome::default())
        }

        fn bind_node(&mut self, name: &str, handle: Handle) {
            self.names.push((name.to_string(), handle));
        }

        fn unbind(&mut self, name: &str) {
            self.names.retain(|(n, _)| n != name);
        }
    }

    #[test]
    fn test_apply_bindings_removes_then_adds() {
        let mut engine = Globals::default();
        engine.bind_node("old", 1);
        engine.bind_node("kept", 2);
        let change = IdBindings { removed: vec!["old".into(), "kept".into()], added: vec![("kept".into(), 5)] };
        engine.apply_bindings(&change);
        assert_eq!(engine.names, vec![("kept".to_string(), 5)]);
    }

    #[test]
    fn test_factories() {
        let closure = || -> Box<dyn ScriptEngine> { Box::new(Globals::default()) };
        let _engine = closure.create();
        let _null = NullEngineFactory.create();
    }
}
