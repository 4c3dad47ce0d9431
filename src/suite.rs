//! Suite registration: explicit builder tables standing in for reflective
//! discovery.
//!
//! A [`Suite`] is the descriptor tree for one run plus the suite-level
//! extensions. The builders assign hierarchical unique ids (`engine` /
//! `fixture` / `case` segment kinds), wire parent links, and enforce the
//! global-uniqueness invariant: duplicate identifiers are a construction
//! error, not a runtime surprise.

use std::collections::HashSet;
use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::descriptor::{ConditionFn, Descriptor, DescriptorKind};
use crate::errors::{suite_construction, VerdictError};
use crate::extension::{Extension, ExtensionRegistry};
use crate::failure::Failure;
use crate::fixture::{FixtureModel, Instance, Member, MemberScope};
use crate::unique_id::UniqueId;

/// Segment kind for container descriptors.
pub const FIXTURE_SEGMENT_KIND: &str = "fixture";
/// Segment kind for case descriptors.
pub const CASE_SEGMENT_KIND: &str = "case";

/// An immutable descriptor tree ready for execution.
pub struct Suite {
    root: Rc<Descriptor>,
    extensions: ExtensionRegistry,
}

impl Suite {
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder {
            name: name.into(),
            extensions: ExtensionRegistry::new(),
            containers: Vec::new(),
        }
    }

    pub fn root(&self) -> &Rc<Descriptor> {
        &self.root
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}

/// Builds the engine root and its containers.
pub struct SuiteBuilder {
    name: String,
    extensions: ExtensionRegistry,
    containers: Vec<ContainerBuilder>,
}

impl SuiteBuilder {
    /// Registers a suite-level extension, visible to every branch.
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.register(Rc::new(extension));
        self
    }

    pub fn container(mut self, container: ContainerBuilder) -> Self {
        self.containers.push(container);
        self
    }

    pub fn build(self) -> Result<Suite, VerdictError> {
        let root = Descriptor::new(
            UniqueId::engine(&self.name),
            self.name.clone(),
            DescriptorKind::Engine,
        );
        let mut seen = HashSet::new();
        seen.insert(root.unique_id().clone());
        for container in self.containers {
            let child = container.build(&root, &mut seen)?;
            root.add_child(child);
        }
        Ok(Suite {
            root,
            extensions: self.extensions,
        })
    }
}

enum ChildSpec {
    Case { name: String, test: Member },
    Container(ContainerBuilder),
}

/// Builds one container descriptor: a fixture grouping with cases and
/// nested containers in declaration order.
pub struct ContainerBuilder {
    name: String,
    fixture: Rc<FixtureModel>,
    condition: Option<ConditionFn>,
    children: Vec<ChildSpec>,
}

impl ContainerBuilder {
    pub fn new(name: impl Into<String>, fixture: Rc<FixtureModel>) -> Self {
        Self {
            name: name.into(),
            fixture,
            condition: None,
            children: Vec::new(),
        }
    }

    /// Unconditionally disables this container with a fixed reason.
    pub fn disabled(self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.disabled_if(move |_| Some(reason.clone()))
    }

    /// Disables this container when the condition yields a reason,
    /// evaluated against the branch context before any side effect.
    pub fn disabled_if(
        mut self,
        condition: impl Fn(&ExecutionContext) -> Option<String> + 'static,
    ) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    /// Registers an instance-scoped test case.
    pub fn case(
        mut self,
        name: impl Into<String>,
        test: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        let name = name.into();
        self.children.push(ChildSpec::Case {
            test: Member::new(name.clone(), MemberScope::Instance, test),
            name,
        });
        self
    }

    /// Registers a test case that runs without an instance.
    pub fn static_case(
        mut self,
        name: impl Into<String>,
        test: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        let name = name.into();
        self.children.push(ChildSpec::Case {
            test: Member::new(name.clone(), MemberScope::Static, test),
            name,
        });
        self
    }

    /// Registers a case from a pre-built member (full control over scope and
    /// hierarchy level).
    pub fn case_member(mut self, name: impl Into<String>, test: Member) -> Self {
        self.children.push(ChildSpec::Case {
            name: name.into(),
            test,
        });
        self
    }

    /// Registers a nested container.
    pub fn nested(mut self, container: ContainerBuilder) -> Self {
        self.children.push(ChildSpec::Container(container));
        self
    }

    fn build(
        self,
        parent: &Rc<Descriptor>,
        seen: &mut HashSet<UniqueId>,
    ) -> Result<Rc<Descriptor>, VerdictError> {
        let id = parent.unique_id().append(FIXTURE_SEGMENT_KIND, &self.name);
        claim(seen, &id)?;
        let descriptor = Descriptor::new(
            id,
            self.name,
            DescriptorKind::Container {
                fixture: self.fixture,
                condition: self.condition,
            },
        );
        for child in self.children {
            match child {
                ChildSpec::Case { name, test } => {
                    let case_id = descriptor.unique_id().append(CASE_SEGMENT_KIND, &name);
                    claim(seen, &case_id)?;
                    let case = Descriptor::new(case_id, name, DescriptorKind::Case { test });
                    descriptor.add_child(case);
                }
                ChildSpec::Container(builder) => {
                    let nested = builder.build(&descriptor, seen)?;
                    descriptor.add_child(nested);
                }
            }
        }
        Ok(descriptor)
    }
}

fn claim(seen: &mut HashSet<UniqueId>, id: &UniqueId) -> Result<(), VerdictError> {
    if !seen.insert(id.clone()) {
        return Err(suite_construction(format!(
            "duplicate descriptor identifier `{id}`; sibling names must be unique"
        )));
    }
    Ok(())
}
