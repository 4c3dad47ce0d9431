//! Fixture models: the owning-type oracle behind every container.
//!
//! A [`FixtureModel`] stands in for the test type a container was built
//! from: how to construct an instance, which instance lifecycle policy the
//! type declares, which extensions it registers, and the ordered member
//! tables for each lifecycle role. The execution nodes treat the model as an
//! opaque oracle: `members(role, order)` answers "the ordered member list
//! for role R", and [`Member::invoke`] runs one resolved member against an
//! instance, surfacing any failure as a single [`Failure`] value.
//!
//! Members carry a hierarchy `level` so that a model assembled from a base
//! type and derived types can honor ancestor-first ("setup") and
//! most-derived-first ("teardown") ordering. Level 0 is the base-most
//! ancestor; registration order breaks ties within a level.

use std::any::Any;
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::extension::Extension;
use crate::failure::Failure;

/// A live test instance. Exclusively owned by the currently executing
/// branch; never shared across branches.
pub type Instance = Rc<RefCell<dyn Any>>;

/// The member-invocation oracle: runs against an instance (or none, for
/// static members) and surfaces any failure as one value.
pub type MemberFn = Rc<dyn Fn(Option<&Instance>) -> Result<(), Failure>>;

/// Constructs a fresh instance.
pub type ConstructorFn = Rc<dyn Fn() -> Result<Instance, Failure>>;

/// Lifecycle roles a member can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    BeforeAll,
    AfterAll,
    BeforeEach,
    AfterEach,
}

/// Whether a member needs a live instance to be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberScope {
    /// Invocable with no instance.
    Static,
    /// Requires the current instance; invoking without one is a lifecycle
    /// violation.
    Instance,
}

/// Requested ordering for a member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyOrder {
    /// Ancestor-first: base-type members run before derived ones.
    TopDown,
    /// Most-derived-first: the reverse, used for teardown.
    BottomUp,
}

/// Instance lifecycle policy of a fixture, a static property of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstancePolicy {
    /// One fresh instance per direct case (the default).
    #[default]
    PerCase,
    /// One instance constructed for the whole container.
    Shared,
}

/// One named, role-taggable callback of a fixture.
#[derive(Clone)]
pub struct Member {
    name: String,
    scope: MemberScope,
    level: usize,
    run: MemberFn,
}

impl Member {
    pub fn new(
        name: impl Into<String>,
        scope: MemberScope,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        Self::at_level(name, scope, 0, run)
    }

    /// A member declared at an explicit hierarchy level. Level 0 is the
    /// base-most ancestor.
    pub fn at_level(
        name: impl Into<String>,
        scope: MemberScope,
        level: usize,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            level,
            run: Rc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> MemberScope {
        self.scope
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn invoke(&self, instance: Option<&Instance>) -> Result<(), Failure> {
        (self.run)(instance)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Immutable description of a fixture type: policy, constructor, extensions,
/// and role-tagged member tables.
pub struct FixtureModel {
    type_name: String,
    instance_policy: InstancePolicy,
    constructor: Option<ConstructorFn>,
    extensions: Vec<Rc<dyn Extension>>,
    members: HashMap<MemberRole, Vec<Member>>,
}

impl FixtureModel {
    pub fn builder(type_name: impl Into<String>) -> FixtureBuilder {
        FixtureBuilder {
            type_name: type_name.into(),
            instance_policy: InstancePolicy::default(),
            constructor: None,
            extensions: Vec::new(),
            members: HashMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn instance_policy(&self) -> InstancePolicy {
        self.instance_policy
    }

    /// Extensions this fixture adds to the inherited set.
    pub fn extensions(&self) -> &[Rc<dyn Extension>] {
        &self.extensions
    }

    /// The ordered member list for a role, ancestor-first or
    /// most-derived-first as requested. Registration order is preserved
    /// within a hierarchy level.
    pub fn members(&self, role: MemberRole, order: HierarchyOrder) -> Vec<Member> {
        let mut members = self.members.get(&role).cloned().unwrap_or_default();
        match order {
            HierarchyOrder::TopDown => members.sort_by_key(Member::level),
            HierarchyOrder::BottomUp => members.sort_by_key(|m| Reverse(m.level())),
        }
        members
    }

    /// Constructs a fresh instance of this fixture.
    pub fn construct(&self) -> Result<Instance, Failure> {
        match &self.constructor {
            Some(constructor) => constructor(),
            None => Err(Failure::lifecycle(format!(
                "fixture `{}` has no constructor registered",
                self.type_name
            ))),
        }
    }
}

impl fmt::Debug for FixtureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureModel")
            .field("type_name", &self.type_name)
            .field("instance_policy", &self.instance_policy)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

/// Builder-table registration for a fixture model.
pub struct FixtureBuilder {
    type_name: String,
    instance_policy: InstancePolicy,
    constructor: Option<ConstructorFn>,
    extensions: Vec<Rc<dyn Extension>>,
    members: HashMap<MemberRole, Vec<Member>>,
}

impl FixtureBuilder {
    pub fn instance_policy(mut self, policy: InstancePolicy) -> Self {
        self.instance_policy = policy;
        self
    }

    /// Registers an infallible constructor for a concrete fixture type.
    pub fn constructor<T: 'static>(mut self, construct: impl Fn() -> T + 'static) -> Self {
        self.constructor = Some(Rc::new(move || {
            Ok(Rc::new(RefCell::new(construct())) as Instance)
        }));
        self
    }

    /// Registers a constructor that may fail.
    pub fn fallible_constructor(
        mut self,
        construct: impl Fn() -> Result<Instance, Failure> + 'static,
    ) -> Self {
        self.constructor = Some(Rc::new(construct));
        self
    }

    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Rc::new(extension));
        self
    }

    /// Registers a member under a role with full control over scope and
    /// hierarchy level.
    pub fn member(mut self, role: MemberRole, member: Member) -> Self {
        self.members.entry(role).or_default().push(member);
        self
    }

    pub fn before_all(
        self,
        name: impl Into<String>,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        self.member(MemberRole::BeforeAll, Member::new(name, MemberScope::Static, run))
    }

    pub fn after_all(
        self,
        name: impl Into<String>,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        self.member(MemberRole::AfterAll, Member::new(name, MemberScope::Static, run))
    }

    pub fn before_each(
        self,
        name: impl Into<String>,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        self.member(
            MemberRole::BeforeEach,
            Member::new(name, MemberScope::Instance, run),
        )
    }

    pub fn after_each(
        self,
        name: impl Into<String>,
        run: impl Fn(Option<&Instance>) -> Result<(), Failure> + 'static,
    ) -> Self {
        self.member(
            MemberRole::AfterEach,
            Member::new(name, MemberScope::Instance, run),
        )
    }

    pub fn build(self) -> Rc<FixtureModel> {
        Rc::new(FixtureModel {
            type_name: self.type_name,
            instance_policy: self.instance_policy,
            constructor: self.constructor,
            extensions: self.extensions,
            members: self.members,
        })
    }
}

/// Borrows the instance as a concrete fixture type for the duration of a
/// member body.
///
/// Fails with a lifecycle violation if no instance is available or the
/// instance is not a `T`.
pub fn with_instance<T: 'static, R>(
    instance: Option<&Instance>,
    body: impl FnOnce(&mut T) -> R,
) -> Result<R, Failure> {
    let instance = instance.ok_or_else(|| {
        Failure::lifecycle("no instance available for an instance-scoped member")
    })?;
    let mut guard = instance.borrow_mut();
    let typed = guard.downcast_mut::<T>().ok_or_else(|| {
        Failure::lifecycle(format!(
            "instance is not of the expected concrete type `{}`",
            std::any::type_name::<T>()
        ))
    })?;
    Ok(body(typed))
}
