//! Execution nodes: the polymorphic units that drive the lifecycle
//! protocol.
//!
//! Every descriptor is wrapped in the matching node kind and executed with a
//! context and a request. The node kinds form a closed, tagged set sharing
//! one `execute(request, context)` contract; adding a future variant (a
//! parameterized case, a legacy adapter) means adding a variant here, not a
//! subclass anywhere.

mod case;
mod container;

pub use case::CaseNode;
pub use container::ContainerNode;

use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::descriptor::{Descriptor, DescriptorKind};
use crate::failure::Failure;
use crate::fixture::{Member, MemberScope};
use crate::listener::SharedListener;

/// Per-run parameters handed to every node: currently just the shared
/// result listener.
pub struct ExecutionRequest {
    listener: SharedListener,
}

impl ExecutionRequest {
    pub fn new(listener: SharedListener) -> Self {
        Self { listener }
    }

    pub fn listener(&self) -> &SharedListener {
        &self.listener
    }
}

/// The closed set of node kinds.
pub enum ExecutionNode {
    Container(ContainerNode),
    Case(CaseNode),
}

impl ExecutionNode {
    /// Wraps a descriptor in the matching node kind.
    pub fn for_descriptor(descriptor: &Rc<Descriptor>) -> Self {
        match descriptor.kind() {
            DescriptorKind::Engine => {
                ExecutionNode::Container(ContainerNode::new(Rc::clone(descriptor), None, None))
            }
            DescriptorKind::Container { fixture, condition } => ExecutionNode::Container(
                ContainerNode::new(Rc::clone(descriptor), Some(Rc::clone(fixture)), condition.clone()),
            ),
            DescriptorKind::Case { test } => {
                ExecutionNode::Case(CaseNode::new(Rc::clone(descriptor), test.clone()))
            }
        }
    }

    /// Executes this node. The context is owned by the branch: the parent
    /// derives it, the node consumes it.
    pub fn execute(&self, request: &ExecutionRequest, context: ExecutionContext) {
        match self {
            ExecutionNode::Container(node) => node.execute(request, context),
            ExecutionNode::Case(node) => node.execute(request, context),
        }
    }
}

/// Invokes one member against the context's current instance, enforcing the
/// member's scope: an instance-scoped member with no instance available is a
/// lifecycle violation, not a silent no-op.
pub(crate) fn invoke_member(member: &Member, context: &ExecutionContext) -> Result<(), Failure> {
    if member.scope() == MemberScope::Instance && context.instance().is_none() {
        return Err(Failure::lifecycle(format!(
            "cannot invoke instance-scoped member `{}` without an instance; \
             declare it static or use a shared instance policy",
            member.name()
        )));
    }
    member.invoke(context.instance())
}
