//! Terminal outcome classification and listener event sequences.

mod common;

use common::{capture, entries, log, new_trace, Counter, Event};
use verdict::failure::Failure;
use verdict::fixture::{FixtureModel, Member, MemberRole, MemberScope};
use verdict::report::{RunEvent, RunEventKind};
use verdict::suite::{ContainerBuilder, Suite};
use verdict::Engine;

fn sequence(events: &[RunEvent]) -> Vec<(RunEventKind, String)> {
    events
        .iter()
        .map(|e| (e.kind, e.display_name.clone()))
        .collect()
}

#[test]
fn skip_signal_yields_skipped_and_siblings_continue() {
    let fixture = FixtureModel::builder("Mixed")
        .constructor(Counter::default)
        .build();
    let suite = Suite::builder("verdict")
        .container(
            ContainerBuilder::new("mixed", fixture)
                .case("pending", |_| Err(Failure::skip("not implemented yet")))
                .case("done", |_| Ok(())),
        )
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert_eq!(
        sequence(&report.events),
        vec![
            (RunEventKind::Started, "verdict".to_string()),
            (RunEventKind::Started, "mixed".to_string()),
            (RunEventKind::Started, "pending".to_string()),
            (RunEventKind::Skipped, "pending".to_string()),
            (RunEventKind::Started, "done".to_string()),
            (RunEventKind::Succeeded, "done".to_string()),
            (RunEventKind::Succeeded, "mixed".to_string()),
            (RunEventKind::Succeeded, "verdict".to_string()),
        ]
    );

    let skip = report
        .events
        .iter()
        .find(|e| e.kind == RunEventKind::Skipped)
        .unwrap();
    assert_eq!(skip.detail.as_deref(), Some("not implemented yet"));
}

#[test]
fn container_teardown_failure_after_successful_cases() {
    let fixture = FixtureModel::builder("LeakAtEnd")
        .constructor(Counter::default)
        .after_all("release", |_| Err(Failure::error("dangling resource")))
        .build();
    let suite = Suite::builder("verdict")
        .container(
            ContainerBuilder::new("leaky", fixture)
                .case("one", |_| Ok(()))
                .case("two", |_| Ok(())),
        )
        .build()
        .unwrap();

    let (captured, shared) = capture();
    Engine::new().execute(&suite, &shared);
    let captured = captured.borrow();

    let successes = captured
        .events
        .iter()
        .filter(|e| matches!(e, Event::Succeeded(name) if name == "one" || name == "two"))
        .count();
    assert_eq!(successes, 2);

    let failure = captured
        .events
        .iter()
        .find_map(|e| match e {
            Event::Failed(name, failure) if name == "leaky" => Some(failure.clone()),
            _ => None,
        })
        .expect("container reports the teardown failure");
    assert_eq!(failure.message(), "dangling resource");
    assert!(failure.suppressed().is_empty());
}

#[test]
fn abort_signal_yields_aborted_and_siblings_continue() {
    let fixture = FixtureModel::builder("Assumptions")
        .constructor(Counter::default)
        .build();
    let suite = Suite::builder("verdict")
        .container(
            ContainerBuilder::new("assumptions", fixture)
                .case("needs network", |_| Err(Failure::abort("network unavailable")))
                .case("local only", |_| Ok(())),
        )
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert_eq!(report.summary.aborted, 1);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 0);
    assert!(report.summary.is_clean());
}

#[test]
fn before_each_failure_skips_the_test_but_not_teardown() {
    let trace = new_trace();
    let (m1, m2, m3) = (trace.clone(), trace.clone(), trace.clone());
    let fixture = FixtureModel::builder("BrokenEachSetup")
        .constructor(Counter::default)
        .before_each("prepare", move |_| {
            log(&m1, "before-each");
            Err(Failure::error("cannot prepare"))
        })
        .after_each("cleanup", move |_| {
            log(&m2, "after-each");
            Ok(())
        })
        .build();
    let suite = Suite::builder("verdict")
        .container(ContainerBuilder::new("broken", fixture).case("case", move |_| {
            log(&m3, "test");
            Ok(())
        }))
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert_eq!(entries(&trace), vec!["before-each", "after-each"]);
    assert_eq!(report.summary.failed, 1);
    // The case itself failed; the container lifecycle stayed clean.
    assert_eq!(report.summary.containers_failed, 0);
}

#[test]
fn skip_from_before_each_classifies_the_case_as_skipped() {
    let fixture = FixtureModel::builder("OfflineSetup")
        .constructor(Counter::default)
        .before_each("connect", |_| Err(Failure::skip("database offline")))
        .build();
    let suite = Suite::builder("verdict")
        .container(ContainerBuilder::new("offline", fixture).case("query", |_| Ok(())))
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.failed, 0);
}

#[test]
fn instance_scoped_before_all_without_instance_is_a_lifecycle_violation() {
    let trace = new_trace();
    let case_trace = trace.clone();
    // Per-case policy: no instance exists when the before-group runs, so an
    // instance-scoped before-all member cannot be invoked.
    let fixture = FixtureModel::builder("WrongScope")
        .constructor(Counter::default)
        .member(
            MemberRole::BeforeAll,
            Member::new("needs instance", MemberScope::Instance, |_| Ok(())),
        )
        .build();
    let suite = Suite::builder("verdict")
        .container(ContainerBuilder::new("wrong-scope", fixture).case("never", move |_| {
            log(&case_trace, "case");
            Ok(())
        }))
        .build()
        .unwrap();

    let (captured, shared) = capture();
    Engine::new().execute(&suite, &shared);
    let captured = captured.borrow();

    assert!(entries(&trace).is_empty());
    let failure = captured
        .events
        .iter()
        .find_map(|e| match e {
            Event::Failed(name, failure) if name == "wrong-scope" => Some(failure.clone()),
            _ => None,
        })
        .expect("container fails on the violation");
    assert!(failure.message().contains("instance-scoped"));
}

#[test]
fn disabled_container_short_circuits_before_any_side_effect() {
    let trace = new_trace();
    let (m1, m2) = (trace.clone(), trace.clone());
    let fixture = FixtureModel::builder("Flagged")
        .constructor(Counter::default)
        .before_all("setup", move |_| {
            log(&m1, "before-all");
            Ok(())
        })
        .build();
    let suite = Suite::builder("verdict")
        .container(
            ContainerBuilder::new("flagged", fixture)
                .disabled("feature flag off")
                .case("case", move |_| {
                    log(&m2, "case");
                    Ok(())
                }),
        )
        .build()
        .unwrap();

    let report = Engine::new().run(&suite);
    assert!(entries(&trace).is_empty());
    assert_eq!(
        sequence(&report.events),
        vec![
            (RunEventKind::Started, "verdict".to_string()),
            (RunEventKind::Skipped, "flagged".to_string()),
            (RunEventKind::Succeeded, "verdict".to_string()),
        ]
    );
    let skip = &report.events[1];
    assert_eq!(skip.detail.as_deref(), Some("feature flag off"));
}
