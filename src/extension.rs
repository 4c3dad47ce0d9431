//! Lifecycle extension protocol.
//!
//! An [`Extension`] is a capability object that may participate in any
//! subset of a closed set of lifecycle roles; every hook has a default no-op
//! body. The engine is polymorphic over "set of objects implementing role
//! R", never over a concrete type: dispatch walks the active registry and
//! invokes the hook on every extension.
//!
//! Ordering mirrors stack discipline: "before" groups run hooks in
//! registration order, "after" groups in reverse registration order, so an
//! extension that sets something up in its pre hook tears it down nearest in
//! time during post.

use std::fmt;
use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::failure::Failure;
use crate::fixture::Instance;

/// Callback hooks around lifecycle method groups.
///
/// `pre_*` hooks run before the corresponding member group, `post_*` hooks
/// after it. `post_process_instance` runs once per freshly constructed
/// instance, before the instance becomes visible to any member.
pub trait Extension {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    fn pre_before_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn post_before_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn pre_after_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn post_after_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn pre_before_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn post_before_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn pre_after_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn post_after_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        Ok(())
    }

    fn post_process_instance(
        &self,
        _context: &ExecutionContext,
        _instance: &Instance,
    ) -> Result<(), Failure> {
        Ok(())
    }
}

/// Ordered set of active extensions.
///
/// Registration order is significant and preserved. The registry only ever
/// grows along a root-to-leaf path; descendants inherit and may extend it,
/// never shrink it.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Rc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Rc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn in_registration_order(&self) -> impl Iterator<Item = &Rc<dyn Extension>> + '_ {
        self.extensions.iter()
    }

    pub fn in_reverse_order(&self) -> impl Iterator<Item = &Rc<dyn Extension>> + '_ {
        self.extensions.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_tuple("ExtensionRegistry").field(&names).finish()
    }
}
