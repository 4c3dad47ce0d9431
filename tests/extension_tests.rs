//! Extension hook ordering and instance post-processing.

mod common;

use common::{entries, log, new_trace, Counter, TraceExtension};
use verdict::fixture::{FixtureModel, InstancePolicy, Member, MemberRole, MemberScope};
use verdict::suite::{ContainerBuilder, Suite};
use verdict::Engine;

#[test]
fn before_hooks_run_in_registration_order_and_after_hooks_reverse() {
    let trace = new_trace();
    let (m1, m2, m3, m4, m5) = (
        trace.clone(),
        trace.clone(),
        trace.clone(),
        trace.clone(),
        trace.clone(),
    );
    let fixture = FixtureModel::builder("OrderFixture")
        .constructor(Counter::default)
        .before_all("before-all", move |_| {
            log(&m1, "member:before-all");
            Ok(())
        })
        .before_each("before-each", move |_| {
            log(&m2, "member:before-each");
            Ok(())
        })
        .after_each("after-each", move |_| {
            log(&m3, "member:after-each");
            Ok(())
        })
        .after_all("after-all", move |_| {
            log(&m4, "member:after-all");
            Ok(())
        })
        .build();

    let suite = Suite::builder("verdict")
        .extension(TraceExtension::new("X", &trace))
        .extension(TraceExtension::new("Y", &trace))
        .container(ContainerBuilder::new("ordered", fixture).case("case", move |_| {
            log(&m5, "member:test");
            Ok(())
        }))
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert!(report.summary.is_clean());
    assert_eq!(
        entries(&trace),
        vec![
            "X:pre-before-all",
            "Y:pre-before-all",
            "member:before-all",
            "X:post-before-all",
            "Y:post-before-all",
            // per-case instance constructed right before the case
            "X:post-process",
            "Y:post-process",
            "X:pre-before-each",
            "Y:pre-before-each",
            "member:before-each",
            "X:post-before-each",
            "Y:post-before-each",
            "member:test",
            "Y:pre-after-each",
            "X:pre-after-each",
            "member:after-each",
            "Y:post-after-each",
            "X:post-after-each",
            "Y:pre-after-all",
            "X:pre-after-all",
            "member:after-all",
            "Y:post-after-all",
            "X:post-after-all",
        ]
    );
}

#[test]
fn instance_post_processing_follows_the_policy() {
    let shared_trace = new_trace();
    let shared_fixture = FixtureModel::builder("SharedFixture")
        .instance_policy(InstancePolicy::Shared)
        .constructor(Counter::default)
        .build();
    let shared_suite = Suite::builder("verdict")
        .extension(TraceExtension::new("X", &shared_trace))
        .container(
            ContainerBuilder::new("shared", shared_fixture)
                .case("one", |_| Ok(()))
                .case("two", |_| Ok(())),
        )
        .build()
        .unwrap();
    Engine::new().run(&shared_suite);
    let shared_hits = entries(&shared_trace)
        .iter()
        .filter(|e| *e == "X:post-process")
        .count();
    assert_eq!(shared_hits, 1);

    let per_case_trace = new_trace();
    let per_case_fixture = FixtureModel::builder("PerCaseFixture")
        .constructor(Counter::default)
        .build();
    let per_case_suite = Suite::builder("verdict")
        .extension(TraceExtension::new("X", &per_case_trace))
        .container(
            ContainerBuilder::new("per-case", per_case_fixture)
                .case("one", |_| Ok(()))
                .case("two", |_| Ok(())),
        )
        .build()
        .unwrap();
    Engine::new().run(&per_case_suite);
    let per_case_hits = entries(&per_case_trace)
        .iter()
        .filter(|e| *e == "X:post-process")
        .count();
    assert_eq!(per_case_hits, 2);
}

#[test]
fn fixture_extensions_extend_the_inherited_set() {
    let trace = new_trace();
    let fixture = FixtureModel::builder("Extended")
        .constructor(Counter::default)
        .extension(TraceExtension::new("Z", &trace))
        .build();

    let suite = Suite::builder("verdict")
        .extension(TraceExtension::new("X", &trace))
        .container(ContainerBuilder::new("extended", fixture).case("case", |_| Ok(())))
        .build()
        .unwrap();

    Engine::new().run(&suite);
    let all = entries(&trace);
    let pre: Vec<&String> = all.iter().filter(|e| e.ends_with(":pre-before-all")).collect();
    let post: Vec<&String> = all.iter().filter(|e| e.ends_with(":pre-after-all")).collect();
    // Inherited extensions first, fixture-level additions after; teardown in
    // reverse.
    assert_eq!(pre, vec!["X:pre-before-all", "Z:pre-before-all"]);
    assert_eq!(post, vec!["Z:pre-after-all", "X:pre-after-all"]);
}

#[test]
fn hierarchy_levels_order_setup_down_and_teardown_up() {
    let trace = new_trace();
    let (m1, m2, m3, m4, m5) = (
        trace.clone(),
        trace.clone(),
        trace.clone(),
        trace.clone(),
        trace.clone(),
    );
    // The derived-level member is registered first; ordering must come from
    // the hierarchy level, not registration order.
    let fixture = FixtureModel::builder("DerivedFixture")
        .constructor(Counter::default)
        .member(
            MemberRole::BeforeEach,
            Member::at_level("derived-setup", MemberScope::Instance, 1, move |_| {
                log(&m1, "before:derived");
                Ok(())
            }),
        )
        .member(
            MemberRole::BeforeEach,
            Member::at_level("base-setup", MemberScope::Instance, 0, move |_| {
                log(&m2, "before:base");
                Ok(())
            }),
        )
        .member(
            MemberRole::AfterEach,
            Member::at_level("base-teardown", MemberScope::Instance, 0, move |_| {
                log(&m3, "after:base");
                Ok(())
            }),
        )
        .member(
            MemberRole::AfterEach,
            Member::at_level("derived-teardown", MemberScope::Instance, 1, move |_| {
                log(&m4, "after:derived");
                Ok(())
            }),
        )
        .build();

    let suite = Suite::builder("verdict")
        .container(ContainerBuilder::new("derived", fixture).case("case", move |_| {
            log(&m5, "test");
            Ok(())
        }))
        .build()
        .unwrap();

    Engine::new().run(&suite);
    assert_eq!(
        entries(&trace),
        vec![
            "before:base",
            "before:derived",
            "test",
            "after:derived",
            "after:base",
        ]
    );
}
