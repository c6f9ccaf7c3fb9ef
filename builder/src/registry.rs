//! The process-wide symbol table mapping plain names to entities.
//!
//! The registry is the fallback tier of resolution: a name is looked up
//! here only after the ancestor-chain search fails. It holds the
//! primitive types, the logging globals and anything else registered
//! without a parent.

use std::collections::HashMap;

use plcgen_dsl::arena::{Arena, EntityId};
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_problems::Problem;

#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, EntityId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity under a plain name.
    ///
    /// Registering the identical entity again is a no-op; a different
    /// entity under an existing name is a duplicate definition.
    pub fn register(
        &mut self,
        arena: &Arena,
        name: &str,
        id: EntityId,
    ) -> Result<(), Diagnostic> {
        match self.entries.get(name) {
            Some(&existing) if existing == id => Ok(()),
            Some(&existing) => Err(Diagnostic::problem(
                Problem::DuplicateDefinition,
                Label::entity(
                    arena.get(id).file_id.clone(),
                    arena.path(id),
                    format!("'{}' is already registered", name),
                )
            )
            .with_secondary(Label::entity(
                arena.get(existing).file_id.clone(),
                arena.path(existing),
                "first registration",
            ))),
            None => {
                self.entries.insert(name.to_string(), id);
                Ok(())
            }
        }
    }

    /// Finds an entity by plain name. Absence is the caller's
    /// unresolved-reference condition; the caller knows the context to
    /// report.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
