//! Per-branch execution state threaded through the node tree.
//!
//! One [`ExecutionContext`] exists per active branch: created when a node
//! begins executing, discarded when it returns. A child context is produced
//! from its parent by [`ExecutionContext::derive`], which copies every
//! inherited field; mutation of a derived context never retroactively
//! affects the parent's view, so descendants see ancestor state but their
//! own writes stay invisible to siblings and ancestors.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::extension::{Extension, ExtensionRegistry};
use crate::fixture::{FixtureModel, Instance};

/// Mutable run-time companion to a descriptor subtree.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    fixture: Option<Rc<FixtureModel>>,
    instance: Option<Instance>,
    extensions: ExtensionRegistry,
    attributes: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl ExecutionContext {
    /// The initial context for a run, carrying the suite-level extensions.
    pub fn new(extensions: ExtensionRegistry) -> Self {
        Self {
            fixture: None,
            instance: None,
            extensions,
            attributes: RefCell::new(HashMap::new()),
        }
    }

    /// Derives a child context inheriting every field of the receiver.
    ///
    /// The attribute bag is copied, not shared: the child reads everything
    /// its ancestors published, but its writes are its own.
    pub fn derive(&self) -> Self {
        self.clone()
    }

    /// The resolved fixture for this branch, if any. The engine root has
    /// none.
    pub fn fixture(&self) -> Option<&Rc<FixtureModel>> {
        self.fixture.as_ref()
    }

    pub fn set_fixture(&mut self, fixture: Option<Rc<FixtureModel>>) {
        self.fixture = fixture;
    }

    /// The current shared or per-case instance, if one has been published.
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    pub fn set_instance(&mut self, instance: Option<Instance>) {
        self.instance = instance;
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Extends the active extension set. Extension sets only ever grow on
    /// the way down the tree; there is no way to shrink an inherited set.
    pub fn register_extension(&mut self, extension: Rc<dyn Extension>) {
        self.extensions.register(extension);
    }

    /// Publishes a cross-cutting attribute, visible to this context and to
    /// contexts later derived from it.
    pub fn set_attribute(&self, key: impl Into<String>, value: Rc<dyn Any>) {
        self.attributes.borrow_mut().insert(key.into(), value);
    }

    /// Reads an attribute published by this branch or an ancestor,
    /// downcast to its concrete type.
    pub fn attribute<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        let attributes = self.attributes.borrow();
        attributes.get(key).cloned().and_then(|v| v.downcast::<T>().ok())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.borrow().contains_key(key)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attribute_keys: Vec<String> = self.attributes.borrow().keys().cloned().collect();
        f.debug_struct("ExecutionContext")
            .field("fixture", &self.fixture.as_ref().map(|x| x.type_name()))
            .field("has_instance", &self.instance.is_some())
            .field("extensions", &self.extensions)
            .field("attribute_keys", &attribute_keys)
            .finish()
    }
}
