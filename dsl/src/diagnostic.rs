//! Provides definition for diagnostics, which are normally errors and
//! warnings associated with building a model.
//!
//! Construction records carry no byte offsets, so a label points at a
//! document and an entity path rather than a position in text.

use plcgen_problems::Problem;

use crate::core::FileId;

/// A label that refers to an element in a document and possibly an
/// associated message.
///
/// Normally this indicates the entity at which an error was detected
/// along with a text message describing the condition.
#[derive(Debug)]
pub struct Label {
    /// Identifier for the document.
    pub file_id: FileId,

    /// Dotted path of the entity this label refers to, when known.
    pub path: Option<String>,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    /// A label for a named entity within a document.
    pub fn entity(
        file_id: impl Into<FileId>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// A label that refers to a document in its entirety rather than a
    /// particular entity.
    pub fn file(file_id: impl Into<FileId>, message: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            path: None,
            message: message.into(),
        }
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        FileId::from_string(value)
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the
/// category, a primary location and a possibly non-zero set of secondary
/// locations.
#[derive(Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions beyond the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code with the specified label.
    ///
    /// The label associates the problem to a particular element in a model
    /// document.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds additional context to the problem description (primary text).
    ///
    /// This forms part of the main description and does not need to be
    /// related to an entity in a document.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_when_no_context_then_constant_message() {
        let diagnostic = Diagnostic::problem(
            Problem::UnresolvedReference,
            Label::file(FileId::default(), "here"),
        );
        assert_eq!(
            diagnostic.description(),
            Problem::UnresolvedReference.message()
        );
    }

    #[test]
    fn description_when_context_then_appends_context() {
        let diagnostic = Diagnostic::problem(
            Problem::UnresolvedReference,
            Label::entity("axes.json", "axes.motor", "not declared before"),
        )
        .with_context("reference", "driver.io");
        assert!(diagnostic.description().contains("reference=driver.io"));
    }
}
