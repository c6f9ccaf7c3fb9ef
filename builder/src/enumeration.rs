//! Enumeration construction.

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{Enum, EnumItem, EntityKind};
use plcgen_dsl::records::EnumRecord;

use crate::context::BuildContext;
use crate::resolve::lookup;

/// Builds an enumeration as a child of `parent`. Items receive
/// zero-based ordinals in declaration order.
pub fn build_enum(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &EnumRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let id = ctx.add_unique_child(
        parent,
        &record.name,
        file_id,
        EntityKind::Enum(Enum {
            underlying: None,
            comment: record.comment.clone(),
            items: vec![],
        }),
    )?;

    if let Some(path) = &record.ty {
        let underlying = lookup(ctx, path, Some(id))?;
        if let EntityKind::Enum(en) = &mut ctx.arena.get_mut(id).kind {
            en.underlying = Some(SymbolRef::Entity(underlying));
        }
    }

    for (ordinal, item_name) in record.items.iter().enumerate() {
        let item = ctx.add_child(
            id,
            item_name,
            file_id,
            EntityKind::EnumItem(EnumItem { ordinal }),
        );
        ctx.mark_resolved(item);
        if let EntityKind::Enum(en) = &mut ctx.arena.get_mut(id).kind {
            en.items.push(item);
        }
    }

    ctx.mark_resolved(id);
    Ok(id)
}
