/* Non-fatal diagnostics collected while parsing and validating a spec */

use serde_derive::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MalformedSpecLine,
    UnknownType,
    DuplicateEntryPoint,
    UnknownEntryPoint,
    UnknownParameter,
    NotAPointer,
    UnknownAttribute,
    InvalidAttributeValue,
    MissingValue,
    UnknownGlobalKey,
    MissingLengthExpression,
    PointerReturn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /* 1-based line in the file the diagnostic came from, if any */
    pub line: Option<usize>,
    pub entry: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn at_line(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: Some(line),
            entry: None,
            message: message.into(),
        }
    }

    pub fn for_entry(kind: DiagnosticKind, entry: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            entry: Some(entry.to_string()),
            message: message.into(),
        }
    }

    /// A table-wide diagnostic tied to no line or entry.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            entry: None,
            message: message.into(),
        }
    }

    pub fn with_entry(mut self, entry: &str) -> Self {
        self.entry = Some(entry.to_string());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, &self.entry) {
            (Some(line), _) => write!(f, "line {}: {}", line, self.message),
            (None, Some(entry)) => write!(f, "{}: {}", entry, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Ordered collection of warnings. Every diagnostic is also logged through
/// `tracing` as it is recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
