//! A document source backed by a directory of JSON model documents.
//!
//! Documents are identified by their path relative to the root, which is
//! also the name an import directive uses. Enumeration is recursive and
//! sorted, so a run is deterministic regardless of filesystem order.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use plcgen_builder::DocumentSource;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::records::DocumentRecord;
use plcgen_problems::Problem;

#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source over the directory. The directory must exist.
    pub fn new(root: &Path) -> Result<Self, Diagnostic> {
        if !root.is_dir() {
            return Err(Diagnostic::problem(
                Problem::DocumentNotFound,
                Label::file(
                    FileId::from_path(root),
                    "input directory does not exist",
                ),
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn collect(&self, dir: &Path, found: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                self.collect(&path, found);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    found.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
    }
}

impl DocumentSource for DirectorySource {
    fn names(&self) -> Vec<String> {
        let mut found = vec![];
        self.collect(&self.root, &mut found);
        debug!("discovered {} documents under {:?}", found.len(), self.root);
        found
    }

    fn document(&self, name: &str) -> Result<DocumentRecord, Diagnostic> {
        let path = self.root.join(name);
        let file_id = FileId::from_string(name);

        let content = fs::read_to_string(&path).map_err(|e| {
            Diagnostic::problem(
                Problem::DocumentNotFound,
                Label::file(file_id.clone(), e.to_string()),
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Diagnostic::problem(
                Problem::InvalidDocument,
                Label::file(file_id.clone(), e.to_string()),
            )
        })
    }
}
