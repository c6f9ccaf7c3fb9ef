//! Struct and config construction.

use log::debug;

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::FileId;
use plcgen_dsl::entity::{EntityKind, Struct};
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::records::{OneOrMany, StructRecord};
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::resolve::lookup;
use crate::variable::build_variable;

/// Builds a struct (or a config, which is a struct with a different
/// category) as a child of `parent`.
pub fn build_struct(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &StructRecord,
    file_id: &FileId,
    config: bool,
) -> Result<EntityId, Diagnostic> {
    debug!("creating struct {}", record.name);
    let payload = Struct {
        comment: record.comment.clone(),
        items: vec![],
    };
    let kind = if config {
        EntityKind::Config(payload)
    } else {
        EntityKind::Struct(payload)
    };
    let id = ctx.add_unique_child(parent, &record.name, file_id, kind)?;

    for item in &record.items {
        let item_id = build_variable(ctx, id, item, file_id)?;
        if let Some(st) = structure_mut(ctx, id) {
            st.items.push(item_id);
        }
    }

    // typeOf is declared after the struct's own items; a subject whose
    // children were already expanded is not re-expanded.
    apply_type_of(ctx, id, &record.type_of)?;

    ctx.mark_resolved(id);
    Ok(id)
}

fn structure_mut<'a>(ctx: &'a mut BuildContext, id: EntityId) -> Option<&'a mut Struct> {
    match &mut ctx.arena.get_mut(id).kind {
        EntityKind::Struct(st) | EntityKind::Config(st) => Some(st),
        _ => None,
    }
}

/// Rewrites each subject's `type` in place to point at `target`.
pub(crate) fn apply_type_of(
    ctx: &mut BuildContext,
    target: EntityId,
    type_of: &Option<OneOrMany<String>>,
) -> Result<(), Diagnostic> {
    let subjects = match type_of {
        Some(list) => list.clone().into_vec(),
        None => return Ok(()),
    };
    for path in subjects {
        let subject = lookup(ctx, &path, Some(target))?;
        match ctx.arena.get_mut(subject).kind.variable_mut() {
            Some(var) => var.ty = Some(SymbolRef::Entity(target)),
            None => {
                return Err(ctx
                    .problem_at(
                        Problem::SchemaViolation,
                        subject,
                        "typeOf subject is not a variable",
                    )
                    .with_context("typeOf", &path));
            }
        }
    }
    Ok(())
}
