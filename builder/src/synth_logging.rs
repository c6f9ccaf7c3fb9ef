//! Logging-propagation synthesis for state machines.
//!
//! Each state machine receives a `_log` method (unless one was declared
//! or inherited) that reports its own name and status fields to the
//! global logger, then invokes `_log` on every part and process with a
//! name derived from the child's place in the tree and a shared local
//! sub-buffer. One buffer threads transparently through arbitrarily
//! deep part/process trees; children that lack a `_log` get a stub so
//! the chain never breaks.

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::{FileId, Id};
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::EntityKind;
use plcgen_dsl::expr::{Call, Expr, Operator, Stmt};
use plcgen_dsl::literal::Literal;
use plcgen_dsl::records::{MethodRecord, VariableRecord};

use crate::context::BuildContext;
use crate::method::build_method;
use crate::resolve::child;

pub(crate) fn ensure_log(
    ctx: &mut BuildContext,
    sm: EntityId,
    file_id: &FileId,
) -> Result<(), Diagnostic> {
    if ctx.arena.get(sm).children.contains("_log") {
        return Ok(());
    }

    let record = MethodRecord {
        name: "_log".to_string(),
        comment: Some("Log to buffer".to_string()),
        input_args: vec![VariableRecord::typed("name", "t_string")
            .with_comment("Name of this function block instance")],
        in_out_args: vec![VariableRecord::typed("buffer", "LogBuffer")
            .with_comment("Buffer receiving all logging")],
        local_args: vec![VariableRecord::typed("subBuffer", "LogBuffer")
            .with_comment("Buffer receiving the logging of parts and processes")],
        return_type: Some("t_bool".to_string()),
    };
    let method = build_method(ctx, sm, &record, file_id)?;
    if let Some(fb) = ctx.arena.get_mut(sm).kind.function_block_mut() {
        fb.methods.push(method);
    }

    let name_arg = child(ctx, method, "name")?;
    let buffer_arg = child(ctx, method, "buffer")?;
    let sub_buffer = child(ctx, method, "subBuffer")?;

    let logger = ctx.logger;
    let mut logger_call = Call::to("loggerCall", logger)
        .with_assignment(
            Expr::entity(child(ctx, logger, "name")?),
            Expr::entity(name_arg),
        )
        .with_assignment(
            Expr::entity(child(ctx, logger, "actualStatus")?),
            Expr::entity(child(ctx, sm, "actualStatus")?),
        )
        .with_assignment(
            Expr::entity(child(ctx, logger, "previousStatus")?),
            Expr::entity(child(ctx, sm, "previousStatus")?),
        )
        .with_assignment(
            Expr::entity(child(ctx, logger, "buffer")?),
            Expr::entity(buffer_arg),
        )
        .with_assignment(
            Expr::entity(child(ctx, logger, "subBuffer")?),
            Expr::entity(sub_buffer),
        );

    let (parts, statuses, processes) = match &ctx.arena.get(sm).kind {
        EntityKind::Statemachine(payload) => (
            payload.parts.clone(),
            payload.statuses.clone(),
            payload.processes.clone(),
        ),
        _ => (vec![], vec![], vec![]),
    };

    let status_member = |name: &str| {
        statuses
            .iter()
            .find(|(status_name, _)| status_name.as_str() == name)
            .map(|(_, id)| *id)
    };
    if let Some(health) = status_member("healthStatus") {
        logger_call = logger_call.with_assignment(
            Expr::entity(child(ctx, logger, "pHealthStatus")?),
            Expr::unary_of(Operator::Adr, Expr::entity(health)),
        );
    }
    if let Some(busy) = status_member("busyStatus") {
        logger_call = logger_call.with_assignment(
            Expr::entity(child(ctx, logger, "pBusyStatus")?),
            Expr::unary_of(Operator::Adr, Expr::entity(busy)),
        );
    }

    let mut body = vec![Stmt::Call(logger_call)];
    for (name, member) in &parts {
        body.push(child_log_call(
            ctx,
            *member,
            name,
            name.as_str().to_string(),
            sub_buffer,
            file_id,
        )?);
    }
    for (name, member) in &processes {
        body.push(child_log_call(
            ctx,
            *member,
            name,
            format!("processes.{}", name),
            sub_buffer,
            file_id,
        )?);
    }

    if let Some(payload) = ctx.arena.get_mut(method).kind.method_mut() {
        payload.implementation = body;
    }
    Ok(())
}

/// A call into a child's `_log`, synthesizing a stub on the child first
/// when it has none.
fn child_log_call(
    ctx: &mut BuildContext,
    member: EntityId,
    name: &Id,
    label: String,
    sub_buffer: EntityId,
    file_id: &FileId,
) -> Result<Stmt, Diagnostic> {
    let log = match ctx.arena.get(member).children.get("_log") {
        Some(existing) => existing,
        None => {
            let stub = MethodRecord {
                name: "_log".to_string(),
                comment: None,
                input_args: vec![VariableRecord::typed("name", "t_string")],
                in_out_args: vec![VariableRecord::typed("buffer", "LogBuffer")],
                local_args: vec![],
                return_type: Some("t_bool".to_string()),
            };
            build_method(ctx, member, &stub, file_id)?
        }
    };

    let call = Call::to(&format!("call_{}", name), member)
        .with_target(Expr::entity(log))
        .with_assignment(
            Expr::entity(child(ctx, log, "name")?),
            Expr::Literal(Literal::string(&label)),
        )
        .with_assignment(
            Expr::entity(child(ctx, log, "buffer")?),
            Expr::entity(sub_buffer),
        );
    Ok(Stmt::Call(call))
}
