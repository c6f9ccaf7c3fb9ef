//! Method construction.

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{EntityKind, Method};
use plcgen_dsl::records::MethodRecord;

use crate::context::BuildContext;
use crate::resolve::lookup;
use crate::variable::build_variable;

/// Builds a method as a child of `parent`. The implementation starts
/// empty; callers and synthesis append statements.
pub fn build_method(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &MethodRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let id = ctx.add_child(
        parent,
        &record.name,
        file_id,
        EntityKind::Method(Method {
            comment: record.comment.clone().unwrap_or_default(),
            ..Method::empty()
        }),
    );

    for (group, records) in [
        (Group::In, &record.input_args),
        (Group::InOut, &record.in_out_args),
        (Group::Local, &record.local_args),
    ] {
        for var_record in records.iter() {
            let var = build_variable(ctx, id, var_record, file_id)?;
            if let Some(method) = ctx.arena.get_mut(id).kind.method_mut() {
                match group {
                    Group::In => method.var_in.push(var),
                    Group::InOut => method.var_inout.push(var),
                    Group::Local => method.var_local.push(var),
                }
            }
        }
    }

    if let Some(path) = &record.return_type {
        let return_type = lookup(ctx, path, Some(id))?;
        if let Some(method) = ctx.arena.get_mut(id).kind.method_mut() {
            method.return_type = Some(SymbolRef::Entity(return_type));
        }
    }

    ctx.mark_resolved(id);
    Ok(id)
}

#[derive(Clone, Copy)]
enum Group {
    In,
    InOut,
    Local,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_method_when_groups_and_return_type_then_all_resolved() {
        let mut ctx = BuildContext::new().unwrap();
        let global = ctx.global;
        let id = build_method(
            &mut ctx,
            global,
            &serde_json::from_value(json!({
                "name": "measure",
                "inputArgs": [ { "name": "window", "type": "t_uint16" } ],
                "localArgs": [ { "name": "accumulator", "type": "t_double" } ],
                "returnType": "t_double"
            }))
            .unwrap(),
            &FileId::default(),
        )
        .unwrap();

        let entity = ctx.arena.get(id);
        assert!(entity.resolved);
        assert!(entity.children.contains("window"));
        match entity.kind.method() {
            Some(method) => {
                assert_eq!(method.var_in.len(), 1);
                assert_eq!(method.var_local.len(), 1);
                assert!(method.return_type.as_ref().unwrap().is_resolved());
            }
            None => panic!("expected method"),
        }
    }
}
