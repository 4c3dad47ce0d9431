//! Shared scaffolding for the integration tests: a trace log, a hook-tracing
//! extension, and a listener that captures terminal causes for inspection.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use verdict::context::ExecutionContext;
use verdict::descriptor::Descriptor;
use verdict::extension::Extension;
use verdict::failure::Failure;
use verdict::fixture::Instance;
use verdict::listener::{RunListener, SharedListener};

pub type Trace = Rc<RefCell<Vec<String>>>;

pub fn new_trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn log(trace: &Trace, entry: impl Into<String>) {
    trace.borrow_mut().push(entry.into());
}

pub fn entries(trace: &Trace) -> Vec<String> {
    trace.borrow().clone()
}

/// Records every hook invocation as `<label>:<hook>` into a shared trace.
pub struct TraceExtension {
    label: &'static str,
    trace: Trace,
}

impl TraceExtension {
    pub fn new(label: &'static str, trace: &Trace) -> Self {
        Self {
            label,
            trace: trace.clone(),
        }
    }

    fn hit(&self, hook: &str) -> Result<(), Failure> {
        log(&self.trace, format!("{}:{}", self.label, hook));
        Ok(())
    }
}

impl Extension for TraceExtension {
    fn name(&self) -> &str {
        self.label
    }

    fn pre_before_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("pre-before-all")
    }

    fn post_before_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("post-before-all")
    }

    fn pre_after_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("pre-after-all")
    }

    fn post_after_all(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("post-after-all")
    }

    fn pre_before_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("pre-before-each")
    }

    fn post_before_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("post-before-each")
    }

    fn pre_after_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("pre-after-each")
    }

    fn post_after_each(&self, _context: &ExecutionContext) -> Result<(), Failure> {
        self.hit("post-after-each")
    }

    fn post_process_instance(
        &self,
        _context: &ExecutionContext,
        _instance: &Instance,
    ) -> Result<(), Failure> {
        self.hit("post-process")
    }
}

/// A captured listener call, keyed by display name.
#[derive(Debug, Clone)]
pub enum Event {
    Started(String),
    Succeeded(String),
    Failed(String, Failure),
    Skipped(String, String),
    Aborted(String, Failure),
}

/// Captures terminal causes so tests can inspect primary/suppressed
/// structure directly.
#[derive(Default)]
pub struct CapturingListener {
    pub events: Vec<Event>,
}

impl RunListener for CapturingListener {
    fn started(&mut self, descriptor: &Descriptor) {
        self.events
            .push(Event::Started(descriptor.display_name().to_string()));
    }

    fn succeeded(&mut self, descriptor: &Descriptor) {
        self.events
            .push(Event::Succeeded(descriptor.display_name().to_string()));
    }

    fn failed(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.events.push(Event::Failed(
            descriptor.display_name().to_string(),
            cause.clone(),
        ));
    }

    fn skipped(&mut self, descriptor: &Descriptor, reason: &str) {
        self.events.push(Event::Skipped(
            descriptor.display_name().to_string(),
            reason.to_string(),
        ));
    }

    fn aborted(&mut self, descriptor: &Descriptor, cause: &Failure) {
        self.events.push(Event::Aborted(
            descriptor.display_name().to_string(),
            cause.clone(),
        ));
    }
}

/// A capturing listener plus the shared handle to hand to the engine.
pub fn capture() -> (Rc<RefCell<CapturingListener>>, SharedListener) {
    let listener = Rc::new(RefCell::new(CapturingListener::default()));
    let shared = SharedListener::from_shared(listener.clone());
    (listener, shared)
}

/// A simple stateful fixture used across the lifecycle tests.
#[derive(Debug, Default)]
pub struct Counter {
    pub hits: u32,
}
