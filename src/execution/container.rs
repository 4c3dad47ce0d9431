//! Container node: full container lifecycle plus child traversal.

use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::descriptor::{ConditionFn, Descriptor};
use crate::execution::{invoke_member, ExecutionNode, ExecutionRequest};
use crate::failure::{Failure, FailureCollector};
use crate::fixture::{FixtureModel, HierarchyOrder, Instance, InstancePolicy, MemberRole};

/// Executes a container descriptor: disable check, instance lifecycle,
/// before-group, children in declaration order, after-group, one terminal
/// report.
pub struct ContainerNode {
    descriptor: Rc<Descriptor>,
    fixture: Option<Rc<FixtureModel>>,
    condition: Option<ConditionFn>,
}

impl ContainerNode {
    pub fn new(
        descriptor: Rc<Descriptor>,
        fixture: Option<Rc<FixtureModel>>,
        condition: Option<ConditionFn>,
    ) -> Self {
        Self {
            descriptor,
            fixture,
            condition,
        }
    }

    pub fn descriptor(&self) -> &Rc<Descriptor> {
        &self.descriptor
    }

    pub fn execute(&self, request: &ExecutionRequest, mut context: ExecutionContext) {
        // This container owns the instance slot and the resolved fixture for
        // its branch. Any instance inherited from an enclosing container is
        // out of scope here.
        context.set_instance(None);
        context.set_fixture(self.fixture.clone());
        if let Some(fixture) = &self.fixture {
            for extension in fixture.extensions() {
                context.register_extension(Rc::clone(extension));
            }
        }

        // Disable short-circuit: no children, no callbacks, no instance.
        if let Some(condition) = &self.condition {
            if let Some(reason) = condition(&context) {
                request.listener().skipped(&self.descriptor, &reason);
                return;
            }
        }
        request.listener().started(&self.descriptor);

        let Some(fixture) = self.fixture.clone() else {
            // Engine root: no lifecycle of its own, just recurse.
            for child in self.descriptor.children() {
                ExecutionNode::for_descriptor(&child).execute(request, context.derive());
            }
            request.listener().succeeded(&self.descriptor);
            return;
        };

        // The instance lifecycle policy is a static property of the fixture
        // type, not of the context.
        let shared = fixture.instance_policy() == InstancePolicy::Shared;
        if shared {
            // Shared: the instance exists before any before-group callback.
            // Construction precedes setup, so a construction failure means
            // setup was never attempted and teardown is not owed.
            match create_instance(&fixture, &context) {
                Ok(instance) => context.set_instance(Some(instance)),
                Err(failure) => {
                    request.listener().failed(&self.descriptor, &failure);
                    return;
                }
            }
        }

        let mut collector = FailureCollector::new();
        let setup_ok = run_before_all(&fixture, &context, &mut collector);

        if setup_ok {
            for child in self.descriptor.children() {
                let mut child_context = context.derive();
                if !shared && child.is_case() {
                    // Per-case: a fresh instance immediately before each
                    // direct case, published into that child's context only.
                    match create_instance(&fixture, &child_context) {
                        Ok(instance) => child_context.set_instance(Some(instance)),
                        Err(failure) => {
                            collector.record(failure);
                            break;
                        }
                    }
                }
                ExecutionNode::for_descriptor(&child).execute(request, child_context);
            }
        }

        // Teardown is unconditional once the before-group was attempted,
        // whether or not it succeeded and whether or not children ran. Under
        // the per-case policy the container context never held an instance;
        // under the shared policy the instance stays visible to teardown.
        run_after_all(&fixture, &context, &mut collector);

        match collector.take() {
            None => request.listener().succeeded(&self.descriptor),
            Some(failure) => request.listener().failed(&self.descriptor, &failure),
        }
    }
}

/// Constructs an instance and runs instance post-processing extensions over
/// it, in registration order.
fn create_instance(
    fixture: &FixtureModel,
    context: &ExecutionContext,
) -> Result<Instance, Failure> {
    let instance = fixture.construct().map_err(|failure| {
        Failure::lifecycle(format!(
            "failed to construct instance of fixture `{}`: {}",
            fixture.type_name(),
            failure
        ))
    })?;
    for extension in context.extensions().in_registration_order() {
        extension
            .post_process_instance(context, &instance)
            .map_err(|failure| {
                Failure::lifecycle(format!(
                    "extension `{}` failed to post-process instance of fixture `{}`: {}",
                    extension.name(),
                    fixture.type_name(),
                    failure
                ))
            })?;
    }
    Ok(instance)
}

/// Before-group: extension pre-hooks in registration order, then before-all
/// members ancestor-first, then extension post-hooks. The first failure
/// aborts the rest of the group; children must not run after it.
fn run_before_all(
    fixture: &FixtureModel,
    context: &ExecutionContext,
    collector: &mut FailureCollector,
) -> bool {
    let outcome: Result<(), Failure> = (|| {
        for extension in context.extensions().in_registration_order() {
            extension.pre_before_all(context)?;
        }
        for member in fixture.members(MemberRole::BeforeAll, HierarchyOrder::TopDown) {
            invoke_member(&member, context)?;
        }
        for extension in context.extensions().in_registration_order() {
            extension.post_before_all(context)?;
        }
        Ok(())
    })();
    match outcome {
        Ok(()) => true,
        Err(failure) => {
            collector.record(failure);
            false
        }
    }
}

/// After-group: extension pre-hooks in reverse registration order, then
/// after-all members most-derived-first, then extension post-hooks. Every
/// step runs even if an earlier one failed; failures aggregate instead of
/// short-circuiting.
fn run_after_all(
    fixture: &FixtureModel,
    context: &ExecutionContext,
    collector: &mut FailureCollector,
) {
    let callbacks: Vec<_> = context.extensions().in_reverse_order().cloned().collect();
    for extension in &callbacks {
        collector.run(|| extension.pre_after_all(context));
    }
    for member in fixture.members(MemberRole::AfterAll, HierarchyOrder::BottomUp) {
        collector.run(|| invoke_member(&member, context));
    }
    for extension in &callbacks {
        collector.run(|| extension.post_after_all(context));
    }
}
