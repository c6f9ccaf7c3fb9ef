//! State machine construction.
//!
//! A state machine is a function block (its internal name carries the
//! `SM_` prefix) whose interface is generated from declared variable
//! groups and from the statuses/parts/processes member blocks. Each
//! member block mints a struct in the library's StateMachines namespace
//! and exposes its members through a typed output variable. After the
//! interface, the synthesis passes append the call wiring and the
//! logging method, and a sibling shadow instance is created for end-user
//! extension.

use log::debug;

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::core::{FileId, Id};
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{
    EntityKind, FunctionBlock, Method, Qualifier, Statemachine,
};
use plcgen_dsl::expr::{Call, Expr, Stmt};
use plcgen_dsl::records::{StatemachineRecord, StructRecord, VariableRecord};
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::function_block::{build_group_variable, extend, push_group, Direction};
use crate::library::library_payload;
use crate::method::build_method;
use crate::resolve::{child, lookup};
use crate::structure::{apply_type_of, build_struct};
use crate::variable::{build_variable, mirror_variable};
use crate::{synth_logging, synth_wiring, REQUEST_RESULTS};

pub fn build_statemachine(
    ctx: &mut BuildContext,
    library: EntityId,
    record: &StatemachineRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    debug!("creating state machine {}", record.name);
    let sm_name = format!("SM_{}", record.name);
    let id = ctx.add_unique_child(
        library,
        &sm_name,
        file_id,
        EntityKind::Statemachine(Statemachine {
            base: FunctionBlock {
                render: record.render.unwrap_or(true),
                ..FunctionBlock::empty()
            },
            parts: vec![],
            statuses: vec![],
            processes: vec![],
        }),
    )?;

    if let Some(base_path) = &record.extends {
        extend(ctx, id, base_path, file_id)?;
    }

    // Declaration order of the interface variables drives the call
    // wiring later.
    let mut interface_vars: Vec<(String, EntityId)> = vec![];

    if !ctx.arena.get(id).children.contains("actualStatus") {
        let var = build_group_variable(
            ctx,
            id,
            &VariableRecord::typed("actualStatus", "t_string")
                .with_comment("Current status description"),
            file_id,
            Direction::Out,
            &[Qualifier::OpcUaActivate, Qualifier::OpcUaAccessRead],
        )?;
        interface_vars.push(("actualStatus".to_string(), var));
    }
    if !ctx.arena.get(id).children.contains("previousStatus") {
        let var = build_group_variable(
            ctx,
            id,
            &VariableRecord::typed("previousStatus", "t_string")
                .with_comment("Previous status description"),
            file_id,
            Direction::Out,
            &[],
        )?;
        interface_vars.push(("previousStatus".to_string(), var));
    }

    let groups: [(&[VariableRecord], Direction, &[Qualifier]); 4] = [
        (
            &record.variables,
            Direction::In,
            &[Qualifier::OpcUaActivate, Qualifier::OpcUaAccessRead],
        ),
        (
            &record.variables_read_only,
            Direction::Out,
            &[Qualifier::OpcUaActivate, Qualifier::OpcUaAccessRead],
        ),
        (
            &record.variables_hidden,
            Direction::In,
            &[Qualifier::OpcUaDeactivate],
        ),
        (
            &record.references,
            Direction::InOut,
            &[Qualifier::OpcUaDeactivate],
        ),
    ];
    for (records, direction, qualifiers) in groups {
        for var_record in records {
            let var = build_group_variable(ctx, id, var_record, file_id, direction, qualifiers)?;
            interface_vars.push((var_record.name.clone(), var));
        }
    }

    let payload = library_payload(ctx, library)?;
    let statuses = member_block(
        ctx,
        id,
        library,
        &record.name,
        "Statuses",
        payload.sm_statuses,
        record.statuses.as_deref(),
        "statuses",
        "Statuses of the state machine",
        file_id,
    )?;
    let parts = member_block(
        ctx,
        id,
        library,
        &record.name,
        "Parts",
        payload.sm_parts,
        record.parts.as_deref(),
        "parts",
        "Parts of the state machine",
        file_id,
    )?;
    let processes = member_block(
        ctx,
        id,
        library,
        &record.name,
        "Processes",
        payload.sm_processes,
        record.processes.as_deref(),
        "processes",
        "Processes of the state machine",
        file_id,
    )?;

    if let Some(items) = &record.processes {
        for item in items {
            forwarding_method(ctx, id, item, &processes, file_id)?;
        }
    }

    for var_record in &record.local {
        let var = build_variable(ctx, id, var_record, file_id)?;
        if let Some(payload) = ctx.arena.get_mut(var).kind.variable_mut() {
            payload.qualifiers = vec![Qualifier::OpcUaActivate];
        }
        push_group(ctx, id, Direction::Local, var);
        interface_vars.push((var_record.name.clone(), var));
    }

    for method_record in &record.methods {
        let method = build_method(ctx, id, method_record, file_id)?;
        if let Some(fb) = ctx.arena.get_mut(id).kind.function_block_mut() {
            fb.methods.push(method);
        }
    }

    if let EntityKind::Statemachine(sm) = &mut ctx.arena.get_mut(id).kind {
        sm.statuses = statuses;
        sm.parts = parts;
        sm.processes = processes;
    }

    synth_wiring::wire(ctx, id, record, &interface_vars, file_id)?;
    synth_logging::ensure_log(ctx, id, file_id)?;

    // The concrete instance users extend; the generated base stays
    // behind the SM_ prefix and the shadow is not rendered.
    let main = ctx.add_unique_child(
        library,
        &record.name,
        file_id,
        EntityKind::FunctionBlock(FunctionBlock {
            render: false,
            ..FunctionBlock::empty()
        }),
    )?;
    extend(ctx, main, &sm_name, file_id)?;
    ctx.mark_resolved(main);
    apply_type_of(ctx, main, &record.type_of)?;

    ctx.mark_resolved(id);
    Ok(id)
}

/// Mints the struct for a statuses/parts/processes block, registers it
/// in the library's StateMachines sub-namespace of the same category and
/// exposes each member through a typed output variable.
#[allow(clippy::too_many_arguments)]
fn member_block(
    ctx: &mut BuildContext,
    sm: EntityId,
    library: EntityId,
    sm_plain_name: &str,
    suffix: &str,
    category_ns: EntityId,
    items: Option<&[VariableRecord]>,
    var_name: &str,
    comment: &str,
    file_id: &FileId,
) -> Result<Vec<(Id, EntityId)>, Diagnostic> {
    let Some(items) = items else {
        return Ok(vec![]);
    };

    let struct_name = format!("{}{}", sm_plain_name, suffix);
    let struct_record = StructRecord {
        name: struct_name.clone(),
        items: items.to_vec(),
        comment: None,
        type_of: None,
    };
    let minted = build_struct(ctx, library, &struct_record, file_id, false)?;
    ctx.link(category_ns, &struct_name, minted);

    let var = build_group_variable(
        ctx,
        sm,
        &VariableRecord::typed(var_name, &struct_name).with_comment(comment),
        file_id,
        Direction::Out,
        &[],
    )?;

    let mut members = vec![];
    for item in items {
        let member = child(ctx, var, &item.name)?;
        members.push((Id::from(&item.name), member));
    }
    Ok(members)
}

/// One method per declared sub-process, forwarding matching inputs into
/// the sub-process's `request`.
fn forwarding_method(
    ctx: &mut BuildContext,
    sm: EntityId,
    item: &VariableRecord,
    members: &[(Id, EntityId)],
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let ty_path = item.ty.as_ref().ok_or_else(|| {
        ctx.problem_at(Problem::SchemaViolation, sm, "process member requires a type")
            .with_context("member", &item.name)
    })?;
    let process_ty = lookup(ctx, ty_path, Some(sm))?;
    let request = match &ctx.arena.get(process_ty).kind {
        EntityKind::Process(process) => process.request,
        _ => None,
    }
    .ok_or_else(|| {
        ctx.problem_at(
            Problem::SchemaViolation,
            process_ty,
            "process member type is not a process",
        )
    })?;

    // The forwarded signature is the request method's inputs.
    let inputs: Vec<(String, Option<EntityId>)> = match ctx.arena.get(request).kind.method() {
        Some(method) => method
            .var_in
            .iter()
            .map(|slot| {
                (
                    ctx.arena.get(*slot).name.as_str().to_string(),
                    ctx.arena
                        .get(*slot)
                        .kind
                        .variable()
                        .and_then(|var| var.ty.as_ref())
                        .and_then(|reference| reference.entity()),
                )
            })
            .collect(),
        None => vec![],
    };

    let method = ctx.add_child(
        sm,
        &item.name,
        file_id,
        EntityKind::Method(Method {
            comment: item.comment.clone().unwrap_or_default(),
            ..Method::empty()
        }),
    );
    for (input_name, input_ty) in &inputs {
        let slot = mirror_variable(ctx, method, input_name, *input_ty, file_id)?;
        if let Some(payload) = ctx.arena.get_mut(method).kind.method_mut() {
            payload.var_in.push(slot);
        }
    }
    let return_type = lookup(ctx, REQUEST_RESULTS, Some(method))?;
    if let Some(payload) = ctx.arena.get_mut(method).kind.method_mut() {
        payload.return_type = Some(SymbolRef::Entity(return_type));
    }

    let member = members
        .iter()
        .find(|(name, _)| name.as_str() == item.name)
        .map(|(_, id)| *id)
        .ok_or_else(|| {
            ctx.problem_at(Problem::UnresolvedReference, sm, "process member not exposed")
                .with_context("member", &item.name)
        })?;
    let member_request = child(ctx, member, "request")?;

    let mut call = Call::to(&format!("call_{}", item.name), member)
        .with_target(Expr::entity(member_request));
    for (input_name, _) in &inputs {
        call = call.with_assignment(
            Expr::entity(child(ctx, member_request, input_name)?),
            Expr::entity(child(ctx, method, input_name)?),
        );
    }

    if let Some(payload) = ctx.arena.get_mut(method).kind.method_mut() {
        payload.implementation = vec![Stmt::assign(Expr::entity(method), Expr::invoke(call))];
    }
    ctx.mark_resolved(method);

    if let Some(fb) = ctx.arena.get_mut(sm).kind.function_block_mut() {
        fb.methods.push(method);
    }
    Ok(method)
}
