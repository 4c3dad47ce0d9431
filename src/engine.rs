//! Engine facade: wraps the descriptor tree in execution nodes and drives a
//! run.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::errors::VerdictError;
use crate::execution::{ExecutionNode, ExecutionRequest};
use crate::listener::SharedListener;
use crate::report::{RecordingListener, RunReport};
use crate::suite::Suite;
use crate::unique_id::{IdFormat, UniqueId};

/// One engine instance. The identifier format is fixed for the instance's
/// lifetime; every suite executed through it shares the same encoding.
pub struct Engine {
    id_format: IdFormat,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            id_format: IdFormat::default(),
        }
    }

    pub fn with_format(id_format: IdFormat) -> Self {
        Self { id_format }
    }

    pub fn id_format(&self) -> &IdFormat {
        &self.id_format
    }

    /// Decodes identifier text under this engine's format.
    pub fn parse_id(&self, text: &str) -> Result<UniqueId, VerdictError> {
        UniqueId::parse(text, &self.id_format)
    }

    /// Encodes an identifier under this engine's format.
    pub fn serialize_id(&self, id: &UniqueId) -> String {
        id.serialize(&self.id_format)
    }

    /// Executes a suite, reporting every event to the given listener.
    ///
    /// Execution is single-threaded and strictly sequential: one branch runs
    /// to completion before the next sibling begins.
    pub fn execute(&self, suite: &Suite, listener: &SharedListener) {
        let request = ExecutionRequest::new(listener.clone());
        let context = ExecutionContext::new(suite.extensions().clone());
        ExecutionNode::for_descriptor(suite.root()).execute(&request, context);
    }

    /// Executes a suite against a recording listener and returns the
    /// complete report.
    pub fn run(&self, suite: &Suite) -> RunReport {
        let recorder = Rc::new(RefCell::new(RecordingListener::new()));
        let listener = SharedListener::from_shared(recorder.clone());
        self.execute(suite, &listener);
        let events = recorder.borrow().events().to_vec();
        RunReport::from_events(events)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
