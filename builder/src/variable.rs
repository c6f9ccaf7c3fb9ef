//! Variable construction and interface expansion.
//!
//! A variable typed by a composite entity mirrors that entity's typed
//! children (and callable members) as its own children, recursively.
//! This is how a struct or function-block interface propagates through
//! every variable typed by it.

use log::debug;

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::{FileId, Id};
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::entity::{Entity, EntityKind, Method, Variable};
use plcgen_dsl::records::VariableRecord;
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::expressions::build_initial;
use crate::resolve::lookup;

/// Builds a variable from its record as a child of `parent`.
pub fn build_variable(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &VariableRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    if record.ty.is_some() && record.points_to_type.is_some() {
        return Err(Diagnostic::problem(
            Problem::SchemaViolation,
            Label::entity(
                file_id.clone(),
                format!("{}.{}", ctx.arena.path(parent), record.name),
                "'type' and 'pointsToType' are mutually exclusive",
            ),
        ));
    }

    let expand = record.expand.unwrap_or(true);
    let id = ctx.add_child(
        parent,
        &record.name,
        file_id,
        EntityKind::Variable(Variable {
            comment: record.comment.clone().unwrap_or_default(),
            qualifiers: record.qualifiers.clone(),
            address: record.address.clone(),
            expand,
            ..Variable::default()
        }),
    );

    if let Some(path) = &record.ty {
        let ty = lookup(ctx, path, Some(id))?;
        if let Some(var) = ctx.arena.get_mut(id).kind.variable_mut() {
            var.ty = Some(SymbolRef::Entity(ty));
        }
        if expand {
            expand_variable(ctx, id, ty)?;
        }
    }

    if let Some(path) = &record.points_to_type {
        let ty = lookup(ctx, path, Some(id))?;
        if let Some(var) = ctx.arena.get_mut(id).kind.variable_mut() {
            var.points_to_type = Some(SymbolRef::Entity(ty));
        }
    }

    if let Some(initial) = &record.initial {
        let value = build_initial(initial, file_id)?;
        if let Some(var) = ctx.arena.get_mut(id).kind.variable_mut() {
            var.initial = Some(value);
        }
    }

    for argument in &record.arguments {
        let argument_id = build_variable(ctx, id, argument, file_id)?;
        if let Some(var) = ctx.arena.get_mut(id).kind.variable_mut() {
            var.arguments.push(argument_id);
        }
    }

    ctx.mark_resolved(id);
    Ok(id)
}

/// Appends a qualifier unless the variable already carries it.
pub(crate) fn ensure_qualifier(
    ctx: &mut BuildContext,
    id: EntityId,
    qualifier: plcgen_dsl::entity::Qualifier,
) {
    if let Some(var) = ctx.arena.get_mut(id).kind.variable_mut() {
        if !var.qualifiers.contains(&qualifier) {
            var.qualifiers.push(qualifier);
        }
    }
}

/// Mirrors the children of `ty` under `owner`.
pub(crate) fn expand_variable(
    ctx: &mut BuildContext,
    owner: EntityId,
    ty: EntityId,
) -> Result<(), Diagnostic> {
    debug!(
        "expanding {} with members of {}",
        ctx.arena.path(owner),
        ctx.arena.path(ty)
    );
    let file_id = ctx.arena.get(owner).file_id.clone();
    let members: Vec<(String, EntityId)> = ctx
        .arena
        .get(ty)
        .children
        .iter()
        .map(|(name, id)| (name.as_str().to_string(), id))
        .collect();

    for (name, member) in members {
        let is_callable = matches!(ctx.arena.get(member).kind, EntityKind::Method(_));
        let is_slot = matches!(
            ctx.arena.get(member).kind,
            EntityKind::Variable(_) | EntityKind::Pointer(_) | EntityKind::EnumItem(_)
        );

        if is_callable {
            mirror_method(ctx, owner, &name, member, &file_id);
        } else if is_slot {
            let member_ty = ctx
                .arena
                .get(member)
                .kind
                .variable()
                .and_then(|var| var.ty.as_ref())
                .and_then(|reference| reference.entity());
            let arguments: Vec<EntityId> = ctx
                .arena
                .get(member)
                .kind
                .variable()
                .map(|var| var.arguments.clone())
                .unwrap_or_default();
            let mirror = mirror_variable(ctx, owner, &name, member_ty, &file_id)?;
            for argument in arguments {
                let argument_name = ctx.arena.get(argument).name.as_str().to_string();
                let argument_ty = ctx
                    .arena
                    .get(argument)
                    .kind
                    .variable()
                    .and_then(|var| var.ty.as_ref())
                    .and_then(|reference| reference.entity());
                mirror_variable(ctx, mirror, &argument_name, argument_ty, &file_id)?;
            }
        }
    }
    Ok(())
}

/// Creates a mirror variable, expanding its own composite type in turn.
pub(crate) fn mirror_variable(
    ctx: &mut BuildContext,
    owner: EntityId,
    name: &str,
    ty: Option<EntityId>,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let mirror = ctx.add_child(
        owner,
        name,
        file_id,
        EntityKind::Variable(Variable {
            ty: ty.map(SymbolRef::Entity),
            ..Variable::default()
        }),
    );
    if let Some(ty) = ty {
        expand_variable(ctx, mirror, ty)?;
    }
    ctx.mark_resolved(mirror);
    Ok(mirror)
}

/// Creates a mirror method carrying the callable signature: input and
/// in-out slots by name and type, plus the return type.
fn mirror_method(
    ctx: &mut BuildContext,
    owner: EntityId,
    name: &str,
    source: EntityId,
    file_id: &FileId,
) -> EntityId {
    let (inputs, inouts, return_type) = match ctx.arena.get(source).kind.method() {
        Some(method) => (
            method.var_in.clone(),
            method.var_inout.clone(),
            method.return_type.clone(),
        ),
        None => (vec![], vec![], None),
    };

    let mirror = ctx.add_child(
        owner,
        name,
        file_id,
        EntityKind::Method(Method {
            return_type,
            ..Method::empty()
        }),
    );

    for (group, slots) in [("in", inputs), ("inout", inouts)] {
        for slot in slots {
            let slot_name = ctx.arena.get(slot).name.as_str().to_string();
            let slot_ty = ctx
                .arena
                .get(slot)
                .kind
                .variable()
                .and_then(|var| var.ty.clone());
            let mirror_slot = ctx.arena.alloc(Entity::new(
                Id::from(&slot_name),
                Some(mirror),
                file_id.clone(),
                EntityKind::Variable(Variable {
                    ty: slot_ty,
                    ..Variable::default()
                }),
            ));
            ctx.arena
                .get_mut(mirror)
                .children
                .insert(Id::from(&slot_name), mirror_slot);
            ctx.mark_resolved(mirror_slot);
            if let Some(method) = ctx.arena.get_mut(mirror).kind.method_mut() {
                match group {
                    "in" => method.var_in.push(mirror_slot),
                    _ => method.var_inout.push(mirror_slot),
                }
            }
        }
    }

    ctx.mark_resolved(mirror);
    mirror
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> VariableRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn build_variable_when_both_type_and_points_to_type_then_schema_violation() {
        let mut ctx = BuildContext::new().unwrap();
        let global = ctx.global;
        let err = build_variable(
            &mut ctx,
            global,
            &record(json!({ "name": "bad", "type": "t_bool", "pointsToType": "t_bool" })),
            &FileId::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, Problem::SchemaViolation.code());
        // Rejected before the child was registered.
        assert!(!ctx.arena.get(ctx.global).children.contains("bad"));
    }

    #[test]
    fn build_variable_when_primitive_type_then_resolved_with_no_children() {
        let mut ctx = BuildContext::new().unwrap();
        let global = ctx.global;
        let id = build_variable(
            &mut ctx,
            global,
            &record(json!({ "name": "speed", "type": "t_double", "initial": {"DOUBLE": "0.5 * 4"} })),
            &FileId::default(),
        )
        .unwrap();
        let entity = ctx.arena.get(id);
        assert!(entity.resolved);
        assert!(entity.children.is_empty());
        match entity.kind.variable() {
            Some(var) => assert_eq!(
                var.initial,
                Some(plcgen_dsl::literal::Literal::Double(2.0))
            ),
            None => panic!("expected variable"),
        }
    }

    #[test]
    fn build_variable_when_unknown_type_then_unresolved_reference() {
        let mut ctx = BuildContext::new().unwrap();
        let global = ctx.global;
        let err = build_variable(
            &mut ctx,
            global,
            &record(json!({ "name": "speed", "type": "t_missing" })),
            &FileId::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, Problem::UnresolvedReference.code());
    }
}
