//! The closed set of entity kinds that make up a program model.
//!
//! Every kind of node a document can declare (or the engine can
//! synthesize) is one variant of [`EntityKind`], so kind dispatch is an
//! exhaustive match rather than downcasting. Specializations hold their
//! base payload by composition: a statemachine is a function block plus
//! the statemachine-only bookkeeping.

use serde::Deserialize;

use crate::arena::{Children, EntityId, SymbolRef};
use crate::core::{FileId, Id};
use crate::expr::Stmt;
use crate::literal::Literal;

/// A node in the model tree.
pub struct Entity {
    pub name: Id,
    /// Owning parent; only roots (the global namespace, expression
    /// temporaries) have none.
    pub parent: Option<EntityId>,
    /// Named children, in insertion order. The entity owns the names;
    /// the arena owns the entities.
    pub children: Children,
    /// Set exactly once, after the entity's direct references have been
    /// resolved. Never reverts.
    pub resolved: bool,
    /// The document that declared this entity.
    pub file_id: FileId,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(name: Id, parent: Option<EntityId>, file_id: FileId, kind: EntityKind) -> Self {
        Self {
            name,
            parent,
            children: Children::new(),
            resolved: false,
            file_id,
            kind,
        }
    }
}

pub enum EntityKind {
    Namespace,
    Library(Library),
    Primitive(Primitive),
    Enum(Enum),
    EnumItem(EnumItem),
    Variable(Variable),
    Pointer(Pointer),
    Struct(Struct),
    Config(Struct),
    Method(Method),
    FunctionBlock(FunctionBlock),
    Status(FunctionBlock),
    Statemachine(Statemachine),
    Process(Process),
}

impl EntityKind {
    /// The function-block payload shared by all callable composites.
    pub fn function_block(&self) -> Option<&FunctionBlock> {
        match self {
            EntityKind::FunctionBlock(fb) | EntityKind::Status(fb) => Some(fb),
            EntityKind::Statemachine(sm) => Some(&sm.base),
            EntityKind::Process(process) => Some(&process.base),
            _ => None,
        }
    }

    pub fn function_block_mut(&mut self) -> Option<&mut FunctionBlock> {
        match self {
            EntityKind::FunctionBlock(fb) | EntityKind::Status(fb) => Some(fb),
            EntityKind::Statemachine(sm) => Some(&mut sm.base),
            EntityKind::Process(process) => Some(&mut process.base),
            _ => None,
        }
    }

    pub fn variable(&self) -> Option<&Variable> {
        match self {
            EntityKind::Variable(var) => Some(var),
            EntityKind::Pointer(pointer) => Some(&pointer.base),
            _ => None,
        }
    }

    pub fn variable_mut(&mut self) -> Option<&mut Variable> {
        match self {
            EntityKind::Variable(var) => Some(var),
            EntityKind::Pointer(pointer) => Some(&mut pointer.base),
            _ => None,
        }
    }

    pub fn structure(&self) -> Option<&Struct> {
        match self {
            EntityKind::Struct(st) | EntityKind::Config(st) => Some(st),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&Method> {
        match self {
            EntityKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn method_mut(&mut self) -> Option<&mut Method> {
        match self {
            EntityKind::Method(method) => Some(method),
            _ => None,
        }
    }

    /// A short noun for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            EntityKind::Namespace => "namespace",
            EntityKind::Library(_) => "library",
            EntityKind::Primitive(_) => "primitive type",
            EntityKind::Enum(_) => "enumeration",
            EntityKind::EnumItem(_) => "enumeration item",
            EntityKind::Variable(_) => "variable",
            EntityKind::Pointer(_) => "pointer",
            EntityKind::Struct(_) => "struct",
            EntityKind::Config(_) => "config",
            EntityKind::Method(_) => "method",
            EntityKind::FunctionBlock(_) => "function block",
            EntityKind::Status(_) => "status",
            EntityKind::Statemachine(_) => "state machine",
            EntityKind::Process(_) => "process",
        }
    }
}

/// A top-level library and the handles of its per-category namespaces.
#[derive(Clone, Copy)]
pub struct Library {
    pub enums: EntityId,
    pub statuses: EntityId,
    pub statemachines: EntityId,
    pub sm_parts: EntityId,
    pub sm_processes: EntityId,
    pub sm_statuses: EntityId,
    pub configs: EntityId,
    pub structs: EntityId,
    pub processes: EntityId,
    pub process_args: EntityId,
    pub functionblocks: EntityId,
}

/// A scalar type from the fixed catalogue.
pub struct Primitive {
    /// Wire-format symbol understood by the renderer, when one exists.
    pub symbol: Option<&'static str>,
}

pub struct Enum {
    pub underlying: Option<SymbolRef>,
    pub comment: Option<String>,
    pub items: Vec<EntityId>,
}

pub struct EnumItem {
    /// Zero-based, assigned by declaration order.
    pub ordinal: usize,
}

/// A named, typed slot.
pub struct Variable {
    /// Scalar or composite type. Mutually exclusive with
    /// `points_to_type`.
    pub ty: Option<SymbolRef>,
    pub points_to_type: Option<SymbolRef>,
    pub initial: Option<Literal>,
    pub comment: String,
    pub qualifiers: Vec<Qualifier>,
    /// Named argument slots for call-site variables (the global logger).
    pub arguments: Vec<EntityId>,
    /// Fixed memory address, passed through to the renderer.
    pub address: Option<String>,
    /// Whether a composite type's children are mirrored under this
    /// variable.
    pub expand: bool,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            ty: None,
            points_to_type: None,
            initial: None,
            comment: String::new(),
            qualifiers: vec![],
            arguments: vec![],
            address: None,
            expand: true,
        }
    }
}

/// A variable that points at another entity.
pub struct Pointer {
    pub base: Variable,
    pub points_to: Option<SymbolRef>,
}

pub struct Struct {
    pub comment: Option<String>,
    /// Item handles, in declaration order. Items are also children.
    pub items: Vec<EntityId>,
}

pub struct Method {
    pub comment: String,
    pub var_in: Vec<EntityId>,
    pub var_inout: Vec<EntityId>,
    pub var_local: Vec<EntityId>,
    pub return_type: Option<SymbolRef>,
    pub implementation: Vec<Stmt>,
}

impl Method {
    pub fn empty() -> Self {
        Self {
            comment: String::new(),
            var_in: vec![],
            var_inout: vec![],
            var_local: vec![],
            return_type: None,
            implementation: vec![],
        }
    }
}

/// The common composite-entity payload.
pub struct FunctionBlock {
    pub comment: String,
    pub var_in: Vec<EntityId>,
    pub var_out: Vec<EntityId>,
    pub var_inout: Vec<EntityId>,
    pub var_local: Vec<EntityId>,
    pub methods: Vec<EntityId>,
    /// The extended entity, once resolved.
    pub extends: Option<SymbolRef>,
    /// The synthetic SUPER pointer added when `extends` is set.
    pub super_ptr: Option<EntityId>,
    /// Whether the renderer emits this entity.
    pub render: bool,
    pub implementation: Vec<Stmt>,
}

impl FunctionBlock {
    pub fn empty() -> Self {
        Self {
            comment: String::new(),
            var_in: vec![],
            var_out: vec![],
            var_inout: vec![],
            var_local: vec![],
            methods: vec![],
            extends: None,
            super_ptr: None,
            render: true,
            implementation: vec![],
        }
    }
}

pub struct Statemachine {
    pub base: FunctionBlock,
    /// Declared parts, exposed as children of the `parts` variable.
    pub parts: Vec<(Id, EntityId)>,
    pub statuses: Vec<(Id, EntityId)>,
    pub processes: Vec<(Id, EntityId)>,
}

pub struct Process {
    pub base: FunctionBlock,
    /// The companion arguments struct, when the process declares
    /// arguments.
    pub args_struct: Option<EntityId>,
    pub start: Option<EntityId>,
    pub request: Option<EntityId>,
}

/// Access and publication attributes attached to variables.
///
/// Each qualifier is a symbol/value pair the renderer emits verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Qualifier {
    #[serde(rename = "OPC_UA_DEACTIVATE")]
    OpcUaDeactivate,
    #[serde(rename = "OPC_UA_ACTIVATE")]
    OpcUaActivate,
    #[serde(rename = "OPC_UA_ACCESS")]
    OpcUaAccess,
    #[serde(rename = "OPC_UA_ACCESS_R")]
    OpcUaAccessRead,
    #[serde(rename = "OPC_UA_ACCESS_W")]
    OpcUaAccessWrite,
    #[serde(rename = "OPC_UA_ACCESS_RW")]
    OpcUaAccessReadWrite,
}

impl Qualifier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Qualifier::OpcUaDeactivate | Qualifier::OpcUaActivate => "OPC.UA.DA",
            Qualifier::OpcUaAccess
            | Qualifier::OpcUaAccessRead
            | Qualifier::OpcUaAccessWrite
            | Qualifier::OpcUaAccessReadWrite => "OPC.UA.DA.Access",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Qualifier::OpcUaDeactivate => "0",
            Qualifier::OpcUaActivate => "1",
            Qualifier::OpcUaAccess => "0",
            Qualifier::OpcUaAccessRead => "1",
            Qualifier::OpcUaAccessWrite => "2",
            Qualifier::OpcUaAccessReadWrite => "3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_block_when_statemachine_then_returns_base() {
        let kind = EntityKind::Statemachine(Statemachine {
            base: FunctionBlock::empty(),
            parts: vec![],
            statuses: vec![],
            processes: vec![],
        });
        assert!(kind.function_block().is_some());
    }

    #[test]
    fn variable_when_pointer_then_returns_base() {
        let kind = EntityKind::Pointer(Pointer {
            base: Variable::default(),
            points_to: None,
        });
        assert!(kind.variable().is_some());
    }

    #[test]
    fn qualifier_when_access_read_then_symbol_and_value() {
        assert_eq!(Qualifier::OpcUaAccessRead.symbol(), "OPC.UA.DA.Access");
        assert_eq!(Qualifier::OpcUaAccessRead.value(), "1");
    }
}
