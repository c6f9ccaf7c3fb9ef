//! Admission-control synthesis for processes.
//!
//! `start` records the requested arguments and marks the process busy
//! and healthy, without any admission check. `request` is the gate: when
//! the process is enabled it answers ACCEPTED and starts; otherwise it
//! answers REJECTED with no side effect. The process body itself is an
//! edge-triggered dispatch for a cyclically scanned interface: a
//! `do_request` flag triggers one request, stores the result and clears
//! itself, then control always falls through to the inherited behavior.

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::entity::EntityKind;
use plcgen_dsl::expr::{Call, Expr, IfThen, Operator, Stmt};
use plcgen_dsl::literal::Literal;
use plcgen_dsl::records::{MethodRecord, VariableRecord};
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::method::build_method;
use crate::resolve::{child, lookup};
use crate::REQUEST_RESULTS;

pub(crate) fn synthesize(
    ctx: &mut BuildContext,
    process: EntityId,
    arguments: &[VariableRecord],
    file_id: &FileId,
) -> Result<(), Diagnostic> {
    let start = synthesize_start(ctx, process, arguments, file_id)?;
    let request = synthesize_request(ctx, process, start, arguments, file_id)?;
    synthesize_dispatch(ctx, process, request, arguments, file_id)?;

    if let EntityKind::Process(payload) = &mut ctx.arena.get_mut(process).kind {
        payload.start = Some(start);
        payload.request = Some(request);
    }
    Ok(())
}

/// The unconditional starter: copy arguments into `get`, set busy, set
/// healthy.
fn synthesize_start(
    ctx: &mut BuildContext,
    process: EntityId,
    arguments: &[VariableRecord],
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let record = MethodRecord {
        name: "start".to_string(),
        comment: Some(
            "Start the process. Performs no admission check and must not be exposed as an \
             externally callable operation."
                .to_string(),
        ),
        input_args: arguments.to_vec(),
        in_out_args: vec![],
        local_args: vec![],
        return_type: None,
    };
    let start = build_method(ctx, process, &record, file_id)?;
    push_method(ctx, process, start);

    let mut body = vec![];
    if !arguments.is_empty() {
        let get_var = child(ctx, process, "get")?;
        for argument in arguments {
            let target = child(ctx, get_var, &argument.name)?;
            let value = child(ctx, start, &argument.name)?;
            body.push(Stmt::assign(Expr::entity(target), Expr::entity(value)));
        }
    }

    let statuses = child(ctx, process, "statuses")?;
    let busy_status = child(ctx, statuses, "busyStatus")?;
    let is_busy = child(ctx, busy_status, "isBusy")?;
    body.push(Stmt::Call(Call::to("setBusy", busy_status).with_assignment(
        Expr::entity(is_busy),
        Expr::Literal(Literal::Bool(true)),
    )));
    let health_status = child(ctx, statuses, "healthStatus")?;
    let is_good = child(ctx, health_status, "isGood")?;
    body.push(Stmt::Call(Call::to("setGood", health_status).with_assignment(
        Expr::entity(is_good),
        Expr::Literal(Literal::Bool(true)),
    )));

    if let Some(method) = ctx.arena.get_mut(start).kind.method_mut() {
        method.implementation = body;
    }
    Ok(start)
}

/// The admission gate: enabled answers ACCEPTED and starts with the same
/// arguments, disabled answers REJECTED and does nothing else.
fn synthesize_request(
    ctx: &mut BuildContext,
    process: EntityId,
    start: EntityId,
    arguments: &[VariableRecord],
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let record = MethodRecord {
        name: "request".to_string(),
        comment: Some("Request the start of this process".to_string()),
        input_args: arguments.to_vec(),
        in_out_args: vec![],
        local_args: vec![],
        return_type: Some(REQUEST_RESULTS.to_string()),
    };
    let request = build_method(ctx, process, &record, file_id)?;
    push_method(ctx, process, request);

    let mut start_call = Call::to("call_start", start);
    for argument in arguments {
        start_call = start_call.with_assignment(
            Expr::entity(child(ctx, start, &argument.name)?),
            Expr::entity(child(ctx, request, &argument.name)?),
        );
    }

    let statuses = child(ctx, process, "statuses")?;
    let enabled_status = child(ctx, statuses, "enabledStatus")?;
    let enabled = child(ctx, enabled_status, "enabled")?;
    let accepted = lookup(
        ctx,
        &format!("{}.ACCEPTED", REQUEST_RESULTS),
        Some(process),
    )?;
    let rejected = lookup(
        ctx,
        &format!("{}.REJECTED", REQUEST_RESULTS),
        Some(process),
    )?;

    let gate = if_then(
        Expr::entity(enabled),
        vec![
            Stmt::assign(Expr::entity(request), Expr::entity(accepted)),
            Stmt::Call(start_call),
        ],
        vec![Stmt::assign(Expr::entity(request), Expr::entity(rejected))],
        file_id,
    )?;
    if let Some(method) = ctx.arena.get_mut(request).kind.method_mut() {
        method.implementation = vec![Stmt::If(gate)];
    }
    Ok(request)
}

/// The one-shot, self-resetting trigger in the process body, followed by
/// the inherited behavior through the dereferenced SUPER pointer.
fn synthesize_dispatch(
    ctx: &mut BuildContext,
    process: EntityId,
    request: EntityId,
    arguments: &[VariableRecord],
    file_id: &FileId,
) -> Result<(), Diagnostic> {
    let mut request_call = Call::to("call_request", request);
    if !arguments.is_empty() {
        let set_var = child(ctx, process, "set")?;
        for argument in arguments {
            request_call = request_call.with_assignment(
                Expr::entity(child(ctx, request, &argument.name)?),
                Expr::entity(child(ctx, set_var, &argument.name)?),
            );
        }
    }

    let do_request = child(ctx, process, "do_request")?;
    let do_request_result = child(ctx, process, "do_request_result")?;
    let dispatch = if_then(
        Expr::entity(do_request),
        vec![
            Stmt::assign(Expr::entity(do_request_result), Expr::invoke(request_call)),
            Stmt::assign(Expr::entity(do_request), Expr::Literal(Literal::Bool(false))),
        ],
        vec![],
        file_id,
    )?;

    let super_ptr = ctx
        .arena
        .get(process)
        .kind
        .function_block()
        .and_then(|fb| fb.super_ptr)
        .ok_or_else(|| {
            ctx.problem_at(
                Problem::UnresolvedReference,
                process,
                "process has no SUPER pointer",
            )
        })?;
    let super_call = Call::to("callSuper", super_ptr)
        .with_target(Expr::unary_of(Operator::Deref, Expr::entity(super_ptr)));

    if let Some(fb) = ctx.arena.get_mut(process).kind.function_block_mut() {
        fb.implementation = vec![Stmt::If(dispatch), Stmt::Call(super_call)];
    }
    Ok(())
}

fn push_method(ctx: &mut BuildContext, owner: EntityId, method: EntityId) {
    if let Some(fb) = ctx.arena.get_mut(owner).kind.function_block_mut() {
        fb.methods.push(method);
    }
}

fn if_then(
    condition: Expr,
    then_body: Vec<Stmt>,
    else_body: Vec<Stmt>,
    file_id: &FileId,
) -> Result<IfThen, Diagnostic> {
    IfThen::new(condition, then_body, else_body).map_err(|e| {
        Diagnostic::problem(
            Problem::SchemaViolation,
            Label::file(file_id.clone(), e.to_string()),
        )
    })
}
