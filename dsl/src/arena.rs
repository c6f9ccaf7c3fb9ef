//! Arena storage for model entities.
//!
//! Every entity lives in one arena and is addressed by a stable handle.
//! Parent links, child maps and all cross-references hold handles, never
//! owning pointers, so the aliasing that the model requires (an entity
//! referenced from many places) has no lifetime consequences. The arena
//! never removes an entity, so a handle is valid for the life of the run.

use std::collections::HashMap;
use std::fmt;

use crate::core::Id;
use crate::entity::Entity;

/// Handle to an entity in an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A reference to another entity.
///
/// Construction stores the literal path text from the document; resolution
/// replaces it with the handle of the entity it names. A reference is
/// resolved at most once.
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolRef {
    /// A dotted path, not yet resolved.
    Named(String),
    /// A resolved reference.
    Entity(EntityId),
}

impl SymbolRef {
    pub fn named(path: &str) -> Self {
        SymbolRef::Named(path.to_string())
    }

    /// The handle, when this reference has been resolved.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            SymbolRef::Named(_) => None,
            SymbolRef::Entity(id) => Some(*id),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SymbolRef::Entity(_))
    }
}

impl From<EntityId> for SymbolRef {
    fn from(id: EntityId) -> Self {
        SymbolRef::Entity(id)
    }
}

/// The children of an entity: a name-to-handle map that remembers
/// insertion order.
///
/// Declaration order is meaningful (enum ordinals, struct layout, call
/// wiring), so iteration must return children in the order they were
/// added.
#[derive(Debug, Default)]
pub struct Children {
    order: Vec<(Id, EntityId)>,
    by_name: HashMap<String, usize>,
}

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a child, returning the previous handle when the
    /// name was already present.
    ///
    /// Replacement keeps the original insertion position. Callers that
    /// must reject duplicates check the returned value.
    pub fn insert(&mut self, name: Id, id: EntityId) -> Option<EntityId> {
        match self.by_name.get(name.as_str()) {
            Some(&at) => {
                let previous = self.order[at].1;
                self.order[at].1 = id;
                Some(previous)
            }
            None => {
                self.by_name
                    .insert(name.as_str().to_string(), self.order.len());
                self.order.push((name, id));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).map(|&at| self.order[at].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Id, EntityId)> {
        self.order.iter().map(|(name, id)| (name, *id))
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().map(|(_, id)| *id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Owns every entity in a model run.
#[derive(Default)]
pub struct Arena {
    entities: Vec<Entity>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity and returns its handle. Linking into a parent's
    /// children is the caller's responsibility.
    pub fn alloc(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The dotted path of an entity composed of its ancestor names,
    /// innermost last. A parentless ancestor (the global namespace) is
    /// not part of the path; root entities yield just their own name.
    pub fn path(&self, id: EntityId) -> String {
        let mut names = vec![self.get(id).name.as_str().to_string()];
        let mut at = self.get(id).parent;
        while let Some(current) = at {
            let entity = self.get(current);
            if entity.parent.is_some() {
                names.push(entity.name.as_str().to_string());
            }
            at = entity.parent;
        }
        names.reverse();
        names.join(".")
    }

    /// The entity and each of its ancestors, nearest first.
    pub fn ancestry(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let mut at = Some(id);
        std::iter::from_fn(move || {
            let current = at?;
            at = self.get(current).parent;
            Some(current)
        })
    }

    /// Collects entities matching the predicate at or below a node.
    ///
    /// Descends through namespaces only, and an entity reachable through
    /// more than one namespace is collected once.
    pub fn collect_below(
        &self,
        root: EntityId,
        matches: impl Fn(&crate::entity::EntityKind) -> bool,
    ) -> Vec<EntityId> {
        let mut found = vec![];
        self.collect_into(root, &matches, &mut found);
        found
    }

    fn collect_into(
        &self,
        at: EntityId,
        matches: &impl Fn(&crate::entity::EntityKind) -> bool,
        found: &mut Vec<EntityId>,
    ) {
        use crate::entity::EntityKind;
        for child in self.get(at).children.ids() {
            let kind = &self.get(child).kind;
            if matches!(kind, EntityKind::Namespace | EntityKind::Library(_)) {
                self.collect_into(child, matches, found);
            } else if matches(kind) && !found.contains(&child) {
                found.push(child);
            }
        }
    }

    /// All enumerations at or below the node.
    pub fn enums_below(&self, root: EntityId) -> Vec<EntityId> {
        use crate::entity::EntityKind;
        self.collect_below(root, |kind| matches!(kind, EntityKind::Enum(_)))
    }

    /// All structs (configs included) at or below the node.
    pub fn structs_below(&self, root: EntityId) -> Vec<EntityId> {
        use crate::entity::EntityKind;
        self.collect_below(root, |kind| {
            matches!(kind, EntityKind::Struct(_) | EntityKind::Config(_))
        })
    }

    /// All function blocks (statuses, state machines and processes
    /// included) at or below the node.
    pub fn function_blocks_below(&self, root: EntityId) -> Vec<EntityId> {
        self.collect_below(root, |kind| kind.function_block().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileId;
    use crate::entity::EntityKind;

    fn node(arena: &mut Arena, name: &str, parent: Option<EntityId>) -> EntityId {
        let id = arena.alloc(Entity {
            name: Id::from(name),
            parent,
            children: Children::new(),
            resolved: false,
            file_id: FileId::default(),
            kind: EntityKind::Namespace,
        });
        if let Some(parent) = parent {
            arena.get_mut(parent).children.insert(Id::from(name), id);
        }
        id
    }

    #[test]
    fn children_when_iterated_then_insertion_order() {
        let mut arena = Arena::new();
        let root = node(&mut arena, "root", None);
        node(&mut arena, "b", Some(root));
        node(&mut arena, "a", Some(root));
        node(&mut arena, "c", Some(root));

        let names: Vec<_> = arena
            .get(root)
            .children
            .iter()
            .map(|(name, _)| name.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn children_when_reinserted_then_returns_previous_and_keeps_position() {
        let mut arena = Arena::new();
        let root = node(&mut arena, "root", None);
        let first = node(&mut arena, "x", Some(root));
        node(&mut arena, "y", Some(root));
        let replacement = node(&mut arena, "other", None);

        let previous = arena
            .get_mut(root)
            .children
            .insert(Id::from("x"), replacement);
        assert_eq!(previous, Some(first));

        let order: Vec<_> = arena.get(root).children.ids().collect();
        assert_eq!(order[0], replacement);
    }

    #[test]
    fn path_when_nested_then_dotted_ancestor_names() {
        let mut arena = Arena::new();
        let global = node(&mut arena, "GLOBAL", None);
        let root = node(&mut arena, "lib", Some(global));
        let mid = node(&mut arena, "Structs", Some(root));
        let leaf = node(&mut arena, "AxisConfig", Some(mid));

        assert_eq!(arena.path(leaf), "lib.Structs.AxisConfig");
    }

    #[test]
    fn path_when_root_then_own_name() {
        let mut arena = Arena::new();
        let root = node(&mut arena, "t_bool", None);
        assert_eq!(arena.path(root), "t_bool");
    }
}
