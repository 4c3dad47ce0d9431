//! Case node: a leaf executing exactly one test member.

use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::descriptor::Descriptor;
use crate::execution::{invoke_member, ExecutionRequest};
use crate::failure::{Failure, FailureCollector, FailureKind};
use crate::fixture::{HierarchyOrder, Member, MemberRole};

/// Executes one test case: started, before-group, the test member, the
/// after-group, then exactly one terminal outcome classified from the
/// aggregated failure.
pub struct CaseNode {
    descriptor: Rc<Descriptor>,
    test: Member,
}

impl CaseNode {
    pub fn new(descriptor: Rc<Descriptor>, test: Member) -> Self {
        Self { descriptor, test }
    }

    pub fn descriptor(&self) -> &Rc<Descriptor> {
        &self.descriptor
    }

    pub fn execute(&self, request: &ExecutionRequest, context: ExecutionContext) {
        request.listener().started(&self.descriptor);

        let mut collector = FailureCollector::new();
        let setup_ok = run_before_each(&context, &mut collector);

        // The test member runs only if its setup completed; which instance
        // it sees was resolved by the enclosing container per its policy.
        if setup_ok {
            collector.run(|| invoke_member(&self.test, &context));
        }

        // Teardown runs regardless of the test outcome; its failures join
        // the same aggregate.
        run_after_each(&context, &mut collector);

        match collector.take() {
            None => request.listener().succeeded(&self.descriptor),
            Some(failure) => match failure.kind() {
                FailureKind::Skip => request
                    .listener()
                    .skipped(&self.descriptor, failure.message()),
                FailureKind::Abort => request.listener().aborted(&self.descriptor, &failure),
                _ => request.listener().failed(&self.descriptor, &failure),
            },
        }
    }
}

/// Before-group for one case, against the case's own derived context:
/// extension pre-hooks in registration order, before-each members
/// ancestor-first, extension post-hooks. First failure aborts the group.
fn run_before_each(context: &ExecutionContext, collector: &mut FailureCollector) -> bool {
    let outcome: Result<(), Failure> = (|| {
        for extension in context.extensions().in_registration_order() {
            extension.pre_before_each(context)?;
        }
        if let Some(fixture) = context.fixture() {
            for member in fixture.members(MemberRole::BeforeEach, HierarchyOrder::TopDown) {
                invoke_member(&member, context)?;
            }
        }
        for extension in context.extensions().in_registration_order() {
            extension.post_before_each(context)?;
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

/// After-group for one case: extension pre-hooks in reverse registration
/// order, after-each members most-derived-first, extension post-hooks.
/// Every step runs; failures aggregate.
fn run_after_each(context: &ExecutionContext, collector: &mut FailureCollector) {
    let callbacks: Vec<_> = context.extensions().in_reverse_order().cloned().collect();
    for extension in &callbacks {
        collector.run(|| extension.pre_after_each(context));
    }
    if let Some(fixture) = context.fixture() {
        for member in fixture.members(MemberRole::AfterEach, HierarchyOrder::BottomUp) {
            collector.run(|| invoke_member(&member, context));
        }
    }
    for extension in &callbacks {
        collector.run(|| extension.post_after_each(context));
    }
}
