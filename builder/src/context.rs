//! The context threaded through every build and resolve call.
//!
//! Owns the arena and the registry; there is no module-level state, so
//! independent runs (and tests) are fully isolated.

use phf::phf_map;

use plcgen_dsl::arena::{Arena, EntityId, SymbolRef};
use plcgen_dsl::core::{FileId, Id};
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::entity::{Entity, EntityKind, Primitive, Struct, Variable};
use plcgen_problems::Problem;

use crate::registry::Registry;

/// The scalar type catalogue: name to wire-format symbol. The renderer
/// understands the symbol; a `None` symbol is an opaque type it handles
/// specially.
static PRIMITIVES: phf::Map<&'static str, Option<&'static str>> = phf_map! {
    "t_bool" => Some("BOOL"),
    "t_bytestring" => None,
    "t_double" => Some("LREAL"),
    "t_float" => Some("REAL"),
    "t_int8" => Some("SINT"),
    "t_int16" => Some("INT"),
    "t_int32" => Some("DINT"),
    "t_int64" => Some("LINT"),
    "t_uint8" => Some("USINT"),
    "t_uint16" => Some("UINT"),
    "t_uint32" => Some("UDINT"),
    "t_uint64" => Some("ULINT"),
    "t_string" => Some("STRING"),
    "t_byte" => Some("BYTE"),
    "t_word" => Some("WORD"),
    "t_dword" => Some("DWORD"),
};

/// The argument slots of the global logger, in call order.
const LOGGER_ARGUMENTS: [(&str, &str); 7] = [
    ("name", "t_string"),
    ("actualStatus", "t_string"),
    ("previousStatus", "t_string"),
    ("buffer", "LogBuffer"),
    ("subBuffer", "LogBuffer"),
    ("pHealthStatus", "t_string"),
    ("pBusyStatus", "t_string"),
];

pub struct BuildContext {
    pub arena: Arena,
    pub registry: Registry,
    /// Root of the entity tree; libraries are its children.
    pub global: EntityId,
    /// The shared log-buffer struct type.
    pub log_buffer: EntityId,
    /// The global logger callable.
    pub logger: EntityId,
}

impl BuildContext {
    /// Creates a context with the primitive types and the logging
    /// globals registered.
    pub fn new() -> Result<Self, Diagnostic> {
        let mut arena = Arena::new();
        let mut registry = Registry::new();

        let global = arena.alloc(Entity::new(
            Id::from("GLOBAL"),
            None,
            FileId::builtin(),
            EntityKind::Namespace,
        ));

        for (name, symbol) in PRIMITIVES.entries() {
            let id = arena.alloc(Entity::new(
                Id::from(name),
                None,
                FileId::builtin(),
                EntityKind::Primitive(Primitive { symbol: *symbol }),
            ));
            registry.register(&arena, name, id)?;
        }

        let log_buffer = arena.alloc(Entity::new(
            Id::from("LogBuffer"),
            None,
            FileId::builtin(),
            EntityKind::Struct(Struct {
                comment: None,
                items: vec![],
            }),
        ));
        registry.register(&arena, "LogBuffer", log_buffer)?;

        let mut ctx = Self {
            arena,
            registry,
            global,
            log_buffer,
            logger: log_buffer, // replaced below
        };
        ctx.logger = ctx.bootstrap_logger()?;
        Ok(ctx)
    }

    /// Creates the LOGGER callable: a global variable whose named
    /// arguments the logging protocol binds on every call.
    fn bootstrap_logger(&mut self) -> Result<EntityId, Diagnostic> {
        let logger = self.arena.alloc(Entity::new(
            Id::from("LOGGER"),
            None,
            FileId::builtin(),
            EntityKind::Variable(Variable::default()),
        ));

        for (name, type_name) in LOGGER_ARGUMENTS {
            let ty = self.registry.find(type_name).ok_or_else(|| {
                Diagnostic::problem(
                    Problem::UnresolvedReference,
                    Label::entity(FileId::builtin(), "LOGGER", "logger argument type"),
                )
                .with_context("type", type_name)
            })?;
            let argument = self.arena.alloc(Entity::new(
                Id::from(name),
                Some(logger),
                FileId::builtin(),
                EntityKind::Variable(Variable {
                    ty: Some(SymbolRef::Entity(ty)),
                    ..Variable::default()
                }),
            ));
            self.arena
                .get_mut(logger)
                .children
                .insert(Id::from(name), argument);
            if let Some(var) = self.arena.get_mut(logger).kind.variable_mut() {
                var.arguments.push(argument);
            }
        }

        self.arena.get_mut(logger).resolved = true;
        self.registry.register(&self.arena, "LOGGER", logger)?;
        Ok(logger)
    }

    /// Allocates an entity and links it under the parent, replacing any
    /// same-named child.
    pub fn add_child(
        &mut self,
        parent: EntityId,
        name: &str,
        file_id: &FileId,
        kind: EntityKind,
    ) -> EntityId {
        let id = self.arena.alloc(Entity::new(
            Id::from(name),
            Some(parent),
            file_id.clone(),
            kind,
        ));
        self.arena
            .get_mut(parent)
            .children
            .insert(Id::from(name), id);
        id
    }

    /// Allocates an entity and links it under the parent, rejecting a
    /// name that is already taken by another child.
    pub fn add_unique_child(
        &mut self,
        parent: EntityId,
        name: &str,
        file_id: &FileId,
        kind: EntityKind,
    ) -> Result<EntityId, Diagnostic> {
        if self.arena.get(parent).children.contains(name) {
            return Err(self
                .problem_at(Problem::DuplicateDefinition, parent, "second declaration")
                .with_context("name", name));
        }
        Ok(self.add_child(parent, name, file_id, kind))
    }

    /// Links an existing entity under an additional parent without
    /// changing its owning parent (category namespaces, flattening).
    pub fn link(&mut self, parent: EntityId, name: &str, child: EntityId) {
        self.arena
            .get_mut(parent)
            .children
            .insert(Id::from(name), child);
    }

    /// Marks an entity resolved. Monotonic; marking twice is harmless
    /// but construction does it exactly once.
    pub fn mark_resolved(&mut self, id: EntityId) {
        self.arena.get_mut(id).resolved = true;
    }

    /// A diagnostic anchored at an entity's document and path.
    pub fn problem_at(
        &self,
        problem: Problem,
        id: EntityId,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::problem(
            problem,
            Label::entity(
                self.arena.get(id).file_id.clone(),
                self.arena.path(id),
                message,
            ),
        )
    }
}
