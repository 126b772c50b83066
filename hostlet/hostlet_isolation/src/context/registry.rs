//! Host-wide guest factory registry.

use std::collections::HashMap;
use std::sync::Arc;

use hostlet_core::{GuestApplication, GuestContext, GuestError, GuestFactory};
use parking_lot::RwLock;
use tracing::debug;

/// Guest factories keyed by fully qualified class name.
#[derive(Default)]
pub struct GuestRegistry {
    factories: RwLock<HashMap<String, GuestFactory>>,
}

impl GuestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `class_name`, returning the factory it
    /// replaced.
    pub fn register(
        &self,
        class_name: impl Into<String>,
        factory: GuestFactory,
    ) -> Option<GuestFactory> {
        let class_name = class_name.into();
        debug!(class = %class_name, "guest factory registered");
        self.factories.write().insert(class_name, factory)
    }

    /// Register a closure as factory.
    pub fn register_fn<F>(&self, class_name: impl Into<String>, factory: F) -> Option<GuestFactory>
    where
        F: Fn(GuestContext) -> Result<Arc<dyn GuestApplication>, GuestError>
            + Send
            + Sync
            + 'static,
    {
        self.register(class_name, Arc::new(factory))
    }

    /// Factory registered under `class_name`.
    pub fn resolve(&self, class_name: &str) -> Option<GuestFactory> {
        self.factories.read().get(class_name).cloned()
    }

    /// Whether `class_name` is registered.
    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.read().contains_key(class_name)
    }

    /// Registered class names, sorted.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.factories.read().keys().cloned().collect();
        classes.sort();
        classes
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl std::fmt::Debug for GuestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestRegistry")
            .field("classes", &self.classes())
            .finish()
    }
}
