//! Immutable descriptors for the static test tree.
//!
//! A descriptor describes one node of the tree discovery produced: the
//! engine root, a container (a fixture grouping), or a case (one executable
//! test). Descriptors are built once before execution begins and read-only
//! during a run. The parent link is a weak reference used for lookup only; a
//! child never owns its parent, so the tree stays acyclic and drops cleanly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::context::ExecutionContext;
use crate::fixture::{FixtureModel, Member};
use crate::unique_id::UniqueId;

/// A disable condition, evaluated against the branch context before any side
/// effect. Returning `Some(reason)` disables the node.
pub type ConditionFn = Rc<dyn Fn(&ExecutionContext) -> Option<String>>;

/// What kind of tree node a descriptor describes.
pub enum DescriptorKind {
    /// The root grouping of a suite; carries no fixture and no lifecycle.
    Engine,
    /// A grouping built from a fixture type.
    Container {
        fixture: Rc<FixtureModel>,
        condition: Option<ConditionFn>,
    },
    /// A leaf: one executable test member.
    Case { test: Member },
}

impl fmt::Debug for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorKind::Engine => write!(f, "Engine"),
            DescriptorKind::Container { fixture, condition } => f
                .debug_struct("Container")
                .field("fixture", &fixture.type_name())
                .field("conditional", &condition.is_some())
                .finish(),
            DescriptorKind::Case { test } => {
                f.debug_struct("Case").field("test", &test.name()).finish()
            }
        }
    }
}

/// One immutable node of the static test tree.
pub struct Descriptor {
    unique_id: UniqueId,
    display_name: String,
    kind: DescriptorKind,
    parent: RefCell<Weak<Descriptor>>,
    children: RefCell<Vec<Rc<Descriptor>>>,
}

impl Descriptor {
    pub fn new(unique_id: UniqueId, display_name: impl Into<String>, kind: DescriptorKind) -> Rc<Self> {
        Rc::new(Self {
            unique_id,
            display_name: display_name.into(),
            kind,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    /// Lookup-only parent link.
    pub fn parent(&self) -> Option<Rc<Descriptor>> {
        self.parent.borrow().upgrade()
    }

    /// Children in declaration order.
    pub fn children(&self) -> Vec<Rc<Descriptor>> {
        self.children.borrow().clone()
    }

    pub fn is_container(&self) -> bool {
        !self.is_case()
    }

    pub fn is_case(&self) -> bool {
        matches!(self.kind, DescriptorKind::Case { .. })
    }

    /// Attaches a child and records the back link. Only the suite
    /// registration layer extends a tree; descriptors are frozen once
    /// execution starts.
    pub(crate) fn add_child(self: &Rc<Self>, child: Rc<Descriptor>) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("unique_id", &self.unique_id.to_string())
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
