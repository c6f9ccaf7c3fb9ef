//! The document scheduler and forward-import protocol.
//!
//! A document declares its imports up front; before any of its entities
//! are built, every imported document is loaded to completion. Loads are
//! idempotent (a document already loaded is skipped), so scan order does
//! not matter. The accumulated import edges form a directed graph that
//! must stay acyclic; a cycle is reported as a diagnostic rather than
//! looping forever.

use std::collections::{HashMap, HashSet};

use log::info;
use petgraph::{
    algo::toposort,
    stable_graph::{NodeIndex, StableDiGraph},
};

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::records::DocumentRecord;
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::library::build_library;

/// Supplies documents by name. The loader crate implements this over a
/// directory; tests implement it over a map.
pub trait DocumentSource {
    /// Document names in scan order.
    fn names(&self) -> Vec<String>;

    /// Decodes one document into construction records.
    fn document(&self, name: &str) -> Result<DocumentRecord, Diagnostic>;
}

pub struct Scheduler<'a, S: DocumentSource> {
    source: &'a S,
    loaded: HashMap<String, EntityId>,
    load_order: Vec<(String, EntityId)>,
    pending: HashSet<String>,

    // The import graph. Each node is a document; an edge points from an
    // importer to its dependency.
    graph: StableDiGraph<(), (), u32>,
    name_to_index: HashMap<String, NodeIndex>,
    index_to_name: HashMap<NodeIndex, String>,
}

impl<'a, S: DocumentSource> Scheduler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            loaded: HashMap::new(),
            load_order: vec![],
            pending: HashSet::new(),
            graph: StableDiGraph::new(),
            name_to_index: HashMap::new(),
            index_to_name: HashMap::new(),
        }
    }

    /// Loads every document the source names, in scan order, honoring
    /// imports. Stops at the first unrecoverable error.
    pub fn run(&mut self, ctx: &mut BuildContext) -> Result<(), Diagnostic> {
        let names = self.source.names();
        if names.is_empty() {
            return Err(Diagnostic::problem(
                Problem::NoContent,
                Label::file(FileId::default(), "no documents to process"),
            ));
        }
        for name in names {
            self.load(ctx, &name)?;
        }
        Ok(())
    }

    /// The libraries built, in completion order.
    pub fn libraries(&self) -> &[(String, EntityId)] {
        &self.load_order
    }

    fn load(&mut self, ctx: &mut BuildContext, name: &str) -> Result<(), Diagnostic> {
        if self.loaded.contains_key(name) {
            return Ok(());
        }
        if self.pending.contains(name) {
            return Err(self.cycle(name));
        }
        self.pending.insert(name.to_string());
        info!("loading document {}", name);

        let document = self.source.document(name)?;
        for import in &document.imports {
            self.add_import_edge(name, import)?;
            self.load(ctx, import)?;
        }

        let library = self.build(ctx, name, &document)?;

        self.pending.remove(name);
        self.loaded.insert(name.to_string(), library);
        self.load_order.push((name.to_string(), library));
        Ok(())
    }

    fn build(
        &mut self,
        ctx: &mut BuildContext,
        name: &str,
        document: &DocumentRecord,
    ) -> Result<EntityId, Diagnostic> {
        let file_id = FileId::from_string(name);
        build_library(ctx, document, &file_id)
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        match self.name_to_index.get(name) {
            Some(existing) => *existing,
            None => {
                let index = self.graph.add_node(());
                self.name_to_index.insert(name.to_string(), index);
                self.index_to_name.insert(index, name.to_string());
                index
            }
        }
    }

    /// Records the dependency and rejects the edge when it closes a
    /// cycle in the accumulated import graph.
    fn add_import_edge(&mut self, from: &str, to: &str) -> Result<(), Diagnostic> {
        let from_index = self.node(from);
        let to_index = self.node(to);
        self.graph.add_edge(from_index, to_index, ());

        toposort(&self.graph, None).map_err(|err| {
            let in_cycle = self
                .index_to_name
                .get(&err.node_id())
                .cloned()
                .unwrap_or_else(|| from.to_string());
            self.cycle(&in_cycle)
        })?;
        Ok(())
    }

    fn cycle(&self, name: &str) -> Diagnostic {
        Diagnostic::problem(
            Problem::CyclicDependency,
            Label::file(FileId::from_string(name), "document participates in a cycle"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MapSource {
        names: Vec<String>,
        documents: HashMap<String, DocumentRecord>,
    }

    impl MapSource {
        fn new(documents: Vec<(&str, serde_json::Value)>) -> Self {
            Self {
                names: documents.iter().map(|(name, _)| name.to_string()).collect(),
                documents: documents
                    .into_iter()
                    .map(|(name, value)| {
                        (name.to_string(), serde_json::from_value(value).unwrap())
                    })
                    .collect(),
            }
        }
    }

    impl DocumentSource for MapSource {
        fn names(&self) -> Vec<String> {
            self.names.clone()
        }

        fn document(&self, name: &str) -> Result<DocumentRecord, Diagnostic> {
            self.documents.get(name).cloned().ok_or_else(|| {
                Diagnostic::problem(
                    Problem::DocumentNotFound,
                    Label::file(FileId::from_string(name), "no such document"),
                )
            })
        }
    }

    fn library(name: &str, imports: Vec<&str>) -> serde_json::Value {
        json!({ "imports": imports, "library": { "name": name, "items": [] } })
    }

    #[test]
    fn run_when_import_listed_after_importer_then_loaded_first_exactly_once() {
        // Scan order lists b before a, but b imports a.
        let source = MapSource::new(vec![
            ("b.json", library("b", vec!["a.json"])),
            ("a.json", library("a", vec![])),
        ]);
        let mut ctx = BuildContext::new().unwrap();
        let mut scheduler = Scheduler::new(&source);
        scheduler.run(&mut ctx).unwrap();

        let order: Vec<_> = scheduler
            .libraries()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(order, vec!["a.json", "b.json"]);
        // Loading a.json again from scan order was skipped; only one
        // library named 'a' exists.
        assert!(ctx.arena.get(ctx.global).children.contains("a"));
        assert_eq!(ctx.arena.get(ctx.global).children.len(), 2);
    }

    #[test]
    fn run_when_diamond_imports_then_shared_dependency_loaded_once() {
        let source = MapSource::new(vec![
            ("top.json", library("top", vec!["left.json", "right.json"])),
            ("left.json", library("left", vec!["base.json"])),
            ("right.json", library("right", vec!["base.json"])),
            ("base.json", library("base", vec![])),
        ]);
        let mut ctx = BuildContext::new().unwrap();
        let mut scheduler = Scheduler::new(&source);
        scheduler.run(&mut ctx).unwrap();
        assert_eq!(scheduler.libraries().len(), 4);
        assert_eq!(scheduler.libraries()[0].0, "base.json");
    }

    #[test]
    fn run_when_cyclic_imports_then_cyclic_dependency() {
        let source = MapSource::new(vec![
            ("a.json", library("a", vec!["b.json"])),
            ("b.json", library("b", vec!["a.json"])),
        ]);
        let mut ctx = BuildContext::new().unwrap();
        let mut scheduler = Scheduler::new(&source);
        let err = scheduler.run(&mut ctx).unwrap_err();
        assert_eq!(err.code, Problem::CyclicDependency.code());
    }

    #[test]
    fn run_when_import_missing_then_document_not_found() {
        let source = MapSource::new(vec![("a.json", library("a", vec!["gone.json"]))]);
        let mut ctx = BuildContext::new().unwrap();
        let mut scheduler = Scheduler::new(&source);
        let err = scheduler.run(&mut ctx).unwrap_err();
        assert_eq!(err.code, Problem::DocumentNotFound.code());
    }

    #[test]
    fn run_when_no_documents_then_no_content() {
        let source = MapSource::new(vec![]);
        let mut ctx = BuildContext::new().unwrap();
        let mut scheduler = Scheduler::new(&source);
        let err = scheduler.run(&mut ctx).unwrap_err();
        assert_eq!(err.code, Problem::NoContent.code());
    }
}
