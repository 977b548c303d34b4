use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::JsonRpcHandler;

/// Method name to handler mapping.
///
/// Built once before serving and shared read-only afterwards. Method names
/// are case-sensitive and unique: registering a name twice is a
/// configuration bug and panics.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JsonRpcHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method`.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `method` already exists.
    pub fn register<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.register_arc(method, Arc::new(handler));
    }

    /// Register an already shared handler, e.g. one serving several methods.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `method` already exists.
    pub fn register_arc(&mut self, method: impl Into<String>, handler: Arc<dyn JsonRpcHandler>) {
        let method = method.into();
        if self.handlers.contains_key(&method) {
            panic!("Handler for method {} already exists", method);
        }
        self.handlers.insert(method, handler);
    }

    /// Builder form of [`HandlerRegistry::register`].
    pub fn with<H>(mut self, method: impl Into<String>, handler: H) -> Self
    where
        H: JsonRpcHandler + 'static,
    {
        self.register(method, handler);
        self
    }

    pub fn get(&self, method: &str) -> Option<&Arc<dyn JsonRpcHandler>> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}
