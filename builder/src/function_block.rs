//! Function block and status construction, including the flattening
//! inheritance mechanism.

use log::debug;

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{EntityKind, FunctionBlock, Pointer, Qualifier, Variable};
use plcgen_dsl::expr::{Expr, Operator, Stmt};
use plcgen_dsl::records::{FunctionBlockRecord, StatusRecord, VariableRecord};

use crate::context::BuildContext;
use crate::expressions::build_expr;
use crate::resolve::{lookup, resolve_stmts};
use crate::structure::apply_type_of;
use crate::variable::build_variable;

/// Builds a function block from its record as a child of `parent`.
pub fn build_function_block(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &FunctionBlockRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    debug!("creating function block {}", record.name);
    let id = ctx.add_unique_child(
        parent,
        &record.name,
        file_id,
        EntityKind::FunctionBlock(FunctionBlock {
            comment: record.comment.clone().unwrap_or_default(),
            render: record.render.unwrap_or(true),
            ..FunctionBlock::empty()
        }),
    )?;

    apply_type_of(ctx, id, &record.type_of)?;

    for var_record in &record.var_in {
        let var = build_variable(ctx, id, var_record, file_id)?;
        push_group(ctx, id, Direction::In, var);
    }
    for var_record in &record.var_out {
        let var = build_variable(ctx, id, var_record, file_id)?;
        push_group(ctx, id, Direction::Out, var);
    }
    for var_record in &record.var_inout {
        let var = build_variable(ctx, id, var_record, file_id)?;
        push_group(ctx, id, Direction::InOut, var);
    }

    if let Some(base_path) = &record.extends {
        extend(ctx, id, base_path, file_id)?;
    }

    ctx.mark_resolved(id);
    Ok(id)
}

/// Direction of an interface variable group.
#[derive(Clone, Copy)]
pub(crate) enum Direction {
    In,
    Out,
    InOut,
    Local,
}

pub(crate) fn push_group(
    ctx: &mut BuildContext,
    fb_id: EntityId,
    direction: Direction,
    var: EntityId,
) {
    if let Some(fb) = ctx.arena.get_mut(fb_id).kind.function_block_mut() {
        match direction {
            Direction::In => fb.var_in.push(var),
            Direction::Out => fb.var_out.push(var),
            Direction::InOut => fb.var_inout.push(var),
            Direction::Local => fb.var_local.push(var),
        }
    }
}

/// Builds an interface variable and attaches the group's accessibility
/// qualifiers.
pub(crate) fn build_group_variable(
    ctx: &mut BuildContext,
    fb_id: EntityId,
    record: &VariableRecord,
    file_id: &FileId,
    direction: Direction,
    qualifiers: &[Qualifier],
) -> Result<EntityId, Diagnostic> {
    let var = build_variable(ctx, fb_id, record, file_id)?;
    for qualifier in qualifiers {
        crate::variable::ensure_qualifier(ctx, var, *qualifier);
    }
    push_group(ctx, fb_id, direction, var);
    Ok(var)
}

/// Flattens the extended entity into `sub`: every child of the base
/// except its own SUPER handle is copied by reference, and a fresh
/// SUPER pointer to the base is added. Chained extends compose because
/// the base was flattened the same way when it was built.
pub(crate) fn extend(
    ctx: &mut BuildContext,
    sub: EntityId,
    base_path: &str,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let base = lookup(ctx, base_path, Some(sub))?;

    if let Some(fb) = ctx.arena.get_mut(sub).kind.function_block_mut() {
        fb.extends = Some(SymbolRef::Entity(base));
    }

    let super_ptr = ctx.add_child(
        sub,
        "SUPER",
        file_id,
        EntityKind::Pointer(Pointer {
            base: Variable {
                points_to_type: Some(SymbolRef::Entity(base)),
                ..Variable::default()
            },
            points_to: None,
        }),
    );
    ctx.mark_resolved(super_ptr);
    if let Some(fb) = ctx.arena.get_mut(sub).kind.function_block_mut() {
        fb.super_ptr = Some(super_ptr);
    }

    let inherited: Vec<(String, EntityId)> = ctx
        .arena
        .get(base)
        .children
        .iter()
        .filter(|(name, _)| name.as_str() != "SUPER")
        .map(|(name, id)| (name.as_str().to_string(), id))
        .collect();
    for (name, child) in inherited {
        ctx.link(sub, &name, child);
    }

    Ok(base)
}

/// Builds a status block: a function block whose boolean state outputs
/// are driven by declared expressions gated on the super state.
pub fn build_status(
    ctx: &mut BuildContext,
    parent: EntityId,
    record: &StatusRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    debug!("creating status {}", record.name);
    let id = ctx.add_unique_child(
        parent,
        &record.name,
        file_id,
        EntityKind::Status(FunctionBlock {
            render: record.render.unwrap_or(true),
            ..FunctionBlock::empty()
        }),
    )?;

    apply_type_of(ctx, id, &record.type_of)?;

    let super_state = build_variable(
        ctx,
        id,
        &VariableRecord::typed("superState", "t_bool")
            .with_comment("TRUE if the super state is active, or if there is no super state")
            .with_initial(plcgen_dsl::records::ExprRecord::Bool(true)),
        file_id,
    )?;
    push_group(ctx, id, Direction::In, super_state);

    for var_record in &record.variables {
        let var = build_variable(ctx, id, var_record, file_id)?;
        push_group(ctx, id, Direction::In, var);
    }

    let mut body = vec![];
    for state in &record.states {
        let var = build_group_variable(
            ctx,
            id,
            &VariableRecord::typed(&state.name, "t_bool")
                .with_comment(state.comment.as_deref().unwrap_or_default()),
            file_id,
            Direction::Out,
            &[Qualifier::OpcUaActivate, Qualifier::OpcUaAccessRead],
        )?;
        let expr = build_expr(&state.expr, file_id)?;
        body.push(Stmt::assign(
            Expr::entity(var),
            Expr::binary(Operator::And, expr, Expr::entity(super_state)),
        ));
    }
    resolve_stmts(ctx, &mut body, id)?;
    if let Some(fb) = ctx.arena.get_mut(id).kind.function_block_mut() {
        fb.implementation = body;
    }

    ctx.mark_resolved(id);
    Ok(id)
}
