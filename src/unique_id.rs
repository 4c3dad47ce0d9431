//! Hierarchical, string-encodable identifiers for execution tree nodes.
//!
//! An identifier is an ordered, non-empty sequence of `(kind, value)`
//! segments. The first segment's kind is always the literal `"engine"`; an
//! identifier not rooted at an engine segment is malformed. Identifiers are
//! value objects: `append` returns a new identifier and never mutates the
//! receiver. They serve as map keys and as the correlation token reported to
//! the run listener.
//!
//! The text encoding wraps each segment as `[kind<sep>value]` and joins
//! segments with a delimiter; both characters are caller-configurable via
//! [`IdFormat`] and fixed for a given engine instance. Parsing is the exact
//! inverse of serialization: for all well-formed text `t`,
//! `parse(t).serialize() == t`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{invalid_format, malformed_identifier, VerdictError};

/// The fixed kind of the root segment of every identifier.
pub const ENGINE_SEGMENT_KIND: &str = "engine";

static DEFAULT_FORMAT: Lazy<IdFormat> =
    Lazy::new(|| IdFormat::new("/", ":").expect("default identifier format is well-formed"));

/// One typed segment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub kind: String,
    pub value: String,
}

impl Segment {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Serialization format for identifiers: a segment delimiter and a
/// kind/value separator, fixed per engine instance.
///
/// The segment pattern is compiled once at construction; both groups are
/// greedy, so a separator character inside a value binds to the *last*
/// occurrence.
#[derive(Debug, Clone)]
pub struct IdFormat {
    segment_delimiter: String,
    kind_value_separator: String,
    segment_pattern: Regex,
}

impl IdFormat {
    pub fn new(delimiter: &str, separator: &str) -> Result<Self, VerdictError> {
        if delimiter.is_empty() {
            return Err(invalid_format("segment delimiter must not be empty"));
        }
        if separator.is_empty() {
            return Err(invalid_format("kind/value separator must not be empty"));
        }
        let pattern = format!(r"^\[(.+){}(.+)\]$", regex::escape(separator));
        let segment_pattern = Regex::new(&pattern)
            .map_err(|e| invalid_format(format!("cannot compile segment pattern: {e}")))?;
        Ok(Self {
            segment_delimiter: delimiter.to_string(),
            kind_value_separator: separator.to_string(),
            segment_pattern,
        })
    }

    pub fn delimiter(&self) -> &str {
        &self.segment_delimiter
    }

    pub fn separator(&self) -> &str {
        &self.kind_value_separator
    }
}

impl Default for IdFormat {
    fn default() -> Self {
        DEFAULT_FORMAT.clone()
    }
}

/// Hierarchical address of a node in the descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId {
    segments: Vec<Segment>,
}

impl UniqueId {
    /// Creates a root identifier consisting of a single engine segment.
    pub fn engine(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::new(ENGINE_SEGMENT_KIND, name)],
        }
    }

    /// Returns a new identifier with one more segment. The receiver is left
    /// untouched.
    pub fn append(&self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::new(kind, value));
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The final segment. Identifiers are never empty, so this is total.
    pub fn last(&self) -> &Segment {
        self.segments
            .last()
            .expect("identifier invariant: segment sequence is non-empty")
    }

    /// Encodes this identifier as text under the given format.
    pub fn serialize(&self, format: &IdFormat) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| format!("[{}{}{}]", s.kind, format.separator(), s.value))
            .collect();
        parts.join(format.delimiter())
    }

    /// Decodes identifier text under the given format.
    ///
    /// Fails with [`VerdictError::MalformedIdentifier`] if the text does not
    /// split into one or more `[kind<sep>value]` segments, or if the first
    /// segment's kind is not `"engine"`.
    pub fn parse(text: &str, format: &IdFormat) -> Result<Self, VerdictError> {
        if text.is_empty() {
            return Err(malformed_identifier("identifier text is empty", text, 0..0));
        }

        let mut segments = Vec::new();
        let mut offset = 0usize;
        for part in text.split(format.delimiter()) {
            let span = offset..offset + part.len();
            let captures = format.segment_pattern.captures(part).ok_or_else(|| {
                malformed_identifier(
                    format!("`{part}` is not a well-formed segment"),
                    text,
                    span.clone(),
                )
            })?;
            segments.push(Segment::new(&captures[1], &captures[2]));
            offset += part.len() + format.delimiter().len();
        }

        if segments[0].kind != ENGINE_SEGMENT_KIND {
            let first_len = text.split(format.delimiter()).next().unwrap_or("").len();
            return Err(malformed_identifier(
                format!(
                    "identifier must start with an engine segment but starts with kind `{}`",
                    segments[0].kind
                ),
                text,
                0..first_len,
            ));
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize(&DEFAULT_FORMAT))
    }
}
