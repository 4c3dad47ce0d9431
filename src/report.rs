//! Run reporting: recorded events, summaries, colored console output.

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::descriptor::Descriptor;
use crate::failure::Failure;
use crate::listener::RunListener;

// ============================================================================
// EVENT LOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunEventKind {
    Started,
    Succeeded,
    Failed,
    Skipped,
    Aborted,
}

/// One listener call, with the serialized unique id as correlation token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEvent {
    pub kind: RunEventKind,
    pub id: String,
    pub display_name: String,
    pub container: bool,
    pub detail: Option<String>,
}

/// Terminal-outcome tallies for one run. Case outcomes are counted
/// individually; container outcomes only matter when they carry a failure
/// or hide cases behind a skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub cases_started: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
    pub containers_failed: usize,
    pub containers_skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, container: bool, kind: RunEventKind) {
        match (container, kind) {
            (false, RunEventKind::Started) => self.cases_started += 1,
            (false, RunEventKind::Succeeded) => self.succeeded += 1,
            (false, RunEventKind::Failed) => self.failed += 1,
            (false, RunEventKind::Skipped) => self.skipped += 1,
            (false, RunEventKind::Aborted) => self.aborted += 1,
            (true, RunEventKind::Failed) => self.containers_failed += 1,
            (true, RunEventKind::Skipped) => self.containers_skipped += 1,
            (true, _) => {}
        }
    }

    /// True when nothing failed anywhere in the run.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.containers_failed == 0
    }
}

/// Records every event in order, for assertions and report generation.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Vec<RunEvent>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for event in &self.events {
            summary.record(event.container, event.kind);
        }
        summary
    }

    fn push(&mut self, kind: RunEventKind, descriptor: &Descriptor, detail: Option<String>) {
        self.events.push(RunEvent {
            kind,
            id: descriptor.unique_id().to_string(),
            display_name: descriptor.display_name().to_string(),
            container: descriptor.is_container(),
            detail,
        });
    }
}

impl RunListener for RecordingListener {
    fn started(&mut self, descriptor: &Descriptor) {
        self.push(RunEventKind::Started, descriptor, None);
    }

    fn succeeded(&mut self, descriptor: &Descriptor) {
        self.push(RunEventKind::Succeeded, descriptor, None);
    }

    fn failed(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.push(RunEventKind::Failed, descriptor, Some(cause.describe()));
    }

    fn skipped(&mut self, descriptor: &Descriptor, reason: &str) {
        self.push(RunEventKind::Skipped, descriptor, Some(reason.to_string()));
    }

    fn aborted(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.push(RunEventKind::Aborted, descriptor, Some(cause.describe()));
    }
}

/// Complete, serializable record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub events: Vec<RunEvent>,
}

impl RunReport {
    pub fn from_events(events: Vec<RunEvent>) -> Self {
        let mut summary = RunSummary::default();
        for event in &events {
            summary.record(event.container, event.kind);
        }
        Self { summary, events }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// CONSOLE OUTPUT
// ============================================================================

/// Streams one colored line per case outcome to stdout and tracks a summary.
pub struct ConsoleListener {
    stream: StandardStream,
    summary: RunSummary,
}

impl ConsoleListener {
    pub fn stdout() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stream: StandardStream::stdout(choice),
            summary: RunSummary::default(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn print_summary(&mut self) {
        let summary = self.summary;
        let color = if summary.is_clean() {
            Color::Green
        } else {
            Color::Red
        };
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        println!(
            "{} passed, {} failed, {} skipped, {} aborted ({} container failure(s))",
            summary.succeeded,
            summary.failed,
            summary.skipped,
            summary.aborted,
            summary.containers_failed
        );
        let _ = self.stream.reset();
    }

    fn print_line(&mut self, tag: &str, color: Color, name: &str, detail: Option<&str>) {
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        print!("{tag}");
        let _ = self.stream.reset();
        match detail {
            Some(detail) => println!(" {name}\n    {}", detail.replace('\n', "\n    ")),
            None => println!(" {name}"),
        }
    }
}

impl RunListener for ConsoleListener {
    fn started(&mut self, descriptor: &Descriptor) {
        self.summary.record(descriptor.is_container(), RunEventKind::Started);
    }

    fn succeeded(&mut self, descriptor: &Descriptor) {
        self.summary
            .record(descriptor.is_container(), RunEventKind::Succeeded);
        if descriptor.is_case() {
            self.print_line("PASS", Color::Green, descriptor.display_name(), None);
        }
    }

    fn failed(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.summary
            .record(descriptor.is_container(), RunEventKind::Failed);
        self.print_line(
            "FAIL",
            Color::Red,
            descriptor.display_name(),
            Some(&cause.describe()),
        );
    }

    fn skipped(&mut self, descriptor: &Descriptor, reason: &str) {
        self.summary
            .record(descriptor.is_container(), RunEventKind::Skipped);
        self.print_line("SKIP", Color::Yellow, descriptor.display_name(), Some(reason));
    }

    fn aborted(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.summary
            .record(descriptor.is_container(), RunEventKind::Aborted);
        self.print_line(
            "ABORT",
            Color::Yellow,
            descriptor.display_name(),
            Some(&cause.describe()),
        );
    }
}
