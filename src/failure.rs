//! Test-level failure values and lossless aggregation.
//!
//! A [`Failure`] is the engine's "thrown condition": the single value a
//! lifecycle member, test member, or extension hook surfaces when it does
//! not complete normally. Distinguished kinds let test code signal an
//! intentional skip or an assumption failure without being classified as a
//! genuine failure.
//!
//! Independent teardown steps may each fail; [`combine`] folds them into one
//! reportable failure without dropping any: the first failure in a phase is
//! always the primary, later ones are attached as suppressed secondaries.

use std::error::Error;
use std::fmt;

/// Classification of a failure, read when translating an aggregate into a
/// terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// An assertion made by test code did not hold.
    Assertion,
    /// Test code requested an intentional skip.
    Skip,
    /// An assumption did not hold; the case is aborted, not failed.
    Abort,
    /// The lifecycle protocol was violated (e.g. an instance-scoped member
    /// invoked with no instance available). Fatal for the container.
    Lifecycle,
    /// Anything else.
    Unclassified,
}

/// A failure raised by a member, constructor, or extension hook, possibly
/// carrying suppressed secondary failures from the same phase.
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    suppressed: Vec<Failure>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suppressed: Vec::new(),
        }
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Assertion, message)
    }

    /// Signals an intentional skip; reported as "skipped", never "failed".
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::Skip, reason)
    }

    /// Signals an assumption failure; reported as "aborted", never "failed".
    pub fn abort(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Abort, message)
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Lifecycle, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unclassified, message)
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suppressed(&self) -> &[Failure] {
        &self.suppressed
    }

    /// Attaches a secondary failure. The receiver stays primary.
    pub fn suppress(&mut self, other: Failure) {
        self.suppressed.push(other);
    }

    /// Renders this failure and its suppressed chain, one per line.
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        for secondary in &self.suppressed {
            out.push_str("\n  suppressed: ");
            out.push_str(&secondary.to_string());
        }
        out
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Assertion => write!(f, "assertion failed: {}", self.message),
            FailureKind::Skip => write!(f, "skipped: {}", self.message),
            FailureKind::Abort => write!(f, "aborted: {}", self.message),
            FailureKind::Lifecycle => write!(f, "lifecycle violation: {}", self.message),
            FailureKind::Unclassified => write!(f, "{}", self.message),
        }
    }
}

impl Error for Failure {}

/// Combines failures from independent steps of one phase.
///
/// If `current` is absent the result is `new`. Otherwise `new` is attached
/// to `current` as a suppressed secondary and `current` is returned
/// unchanged as the primary. Order-preserving: running the same sequence of
/// outcomes always yields the same primary/secondary structure.
pub fn combine(current: Option<Failure>, new: Failure) -> Failure {
    match current {
        None => new,
        Some(mut primary) => {
            primary.suppress(new);
            primary
        }
    }
}

/// Accumulates failures across the steps of a teardown phase, where every
/// step must run even if an earlier one failed.
#[derive(Debug, Default)]
pub struct FailureCollector {
    failure: Option<Failure>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one step, folding any failure into the aggregate.
    pub fn run(&mut self, step: impl FnOnce() -> Result<(), Failure>) {
        if let Err(failure) = step() {
            self.record(failure);
        }
    }

    pub fn record(&mut self, failure: Failure) {
        self.failure = Some(combine(self.failure.take(), failure));
    }

    pub fn is_empty(&self) -> bool {
        self.failure.is_none()
    }

    /// Takes the aggregated failure, leaving the collector empty.
    pub fn take(&mut self) -> Option<Failure> {
        self.failure.take()
    }
}
