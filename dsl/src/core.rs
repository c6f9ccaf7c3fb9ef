//! Common items for identifying model elements and their origin.
use core::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::{hash::Hash, hash::Hasher};

static EMPTY_FILE_ID: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from(""));

/// FileId identifies the document that declared a model element.
///
/// FileId is normally the path of an input document. It can also represent
/// entities that are built into the engine (primitive types, the logging
/// globals) and therefore have no declaring document.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FileId {
    /// A model document. The string is the document path or name.
    File(Arc<str>),
    /// Built-in to the engine (primitive types, bootstrap globals).
    BuiltIn,
}

impl FileId {
    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId::File(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice is normally
    /// the document path.
    pub fn from_string(path: &str) -> Self {
        FileId::File(Arc::from(path))
    }

    /// Creates a file identifier for engine-defined entities.
    pub fn builtin() -> Self {
        FileId::BuiltIn
    }

    /// Returns true if this FileId represents a built-in entity.
    pub fn is_builtin(&self) -> bool {
        matches!(self, FileId::BuiltIn)
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId::File(EMPTY_FILE_ID.clone())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileId::File(path) => write!(f, "{}", path),
            FileId::BuiltIn => write!(f, "<builtin>"),
        }
    }
}

/// The name of a model entity.
///
/// Document names are case sensitive, so unlike IEC 61131-3 identifiers
/// there is no case-folded comparison here. Names become identifiers in
/// the rendered program text unchanged.
pub struct Id {
    name: String,
}

impl Id {
    /// Converts a `&str` into an `Id`.
    pub fn from(str: &str) -> Self {
        Id {
            name: String::from(str),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Clone for Id {
    fn clone(&self) -> Self {
        Id::from(self.name.as_str())
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Id {}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_when_display_then_returns_value() {
        let file_id = FileId::from_string("models/axes.json");
        assert_eq!(format!("{file_id}"), "models/axes.json");
    }

    #[test]
    fn file_id_builtin_when_display_then_returns_builtin_marker() {
        assert_eq!(format!("{}", FileId::builtin()), "<builtin>");
    }

    #[test]
    fn file_id_builtin_when_compared_to_file_then_not_equal() {
        assert_ne!(FileId::builtin(), FileId::from_string("a.json"));
    }

    #[test]
    fn id_when_case_differs_then_not_equal() {
        assert_ne!(Id::from("axis"), Id::from("Axis"));
    }
}
