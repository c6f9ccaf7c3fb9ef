//! End-to-end model building tests over construction records.

use serde_json::json;

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::entity::EntityKind;
use plcgen_dsl::expr::{Expr, Operator, Stmt};
use plcgen_dsl::literal::Literal;
use plcgen_dsl::records::DocumentRecord;

use crate::context::BuildContext;
use crate::library::build_library;

/// The conventional common library: the request-result enumeration, the
/// status blocks and the process base every process extends.
fn common_document() -> serde_json::Value {
    json!({
        "library": {
            "name": "common",
            "items": [
                { "ENUMERATION": { "name": "RequestResults",
                                   "items": ["ACCEPTED", "REJECTED"] } },
                { "STATUS": { "name": "EnabledStatus",
                              "variables": [ { "name": "isEnabled", "type": "t_bool" } ],
                              "states": [
                                  { "name": "enabled", "expr": "isEnabled" },
                                  { "name": "disabled", "expr": { "NOT": ["isEnabled"] } } ] } },
                { "STATUS": { "name": "BusyStatus",
                              "variables": [ { "name": "isBusy", "type": "t_bool" } ],
                              "states": [
                                  { "name": "busy", "expr": "isBusy" },
                                  { "name": "idle", "expr": { "NOT": ["isBusy"] } } ] } },
                { "STATUS": { "name": "HealthStatus",
                              "variables": [
                                  { "name": "isGood", "type": "t_bool" },
                                  { "name": "hasWarning", "type": "t_bool" } ],
                              "states": [
                                  { "name": "good", "expr": "isGood" },
                                  { "name": "bad", "expr": { "NOT": ["isGood"] } } ] } },
                { "STRUCT": { "name": "ProcessStatuses",
                              "items": [
                                  { "name": "enabledStatus", "type": "EnabledStatus" },
                                  { "name": "busyStatus", "type": "BusyStatus" },
                                  { "name": "healthStatus", "type": "HealthStatus" } ] } },
                { "FB": { "name": "BaseProcess",
                          "in": [ { "name": "do_request", "type": "t_bool" } ],
                          "out": [
                              { "name": "do_request_result", "type": "RequestResults" },
                              { "name": "statuses", "type": "ProcessStatuses" } ] } }
            ]
        }
    })
}

fn build(ctx: &mut BuildContext, name: &str, value: serde_json::Value) -> EntityId {
    let document: DocumentRecord = serde_json::from_value(value).unwrap();
    build_library(ctx, &document, &FileId::from_string(name)).unwrap()
}

fn context_with_common() -> BuildContext {
    let mut ctx = BuildContext::new().unwrap();
    build(&mut ctx, "common.json", common_document());
    ctx
}

fn descend(ctx: &BuildContext, from: EntityId, path: &[&str]) -> EntityId {
    let mut at = from;
    for segment in path {
        at = ctx
            .arena
            .get(at)
            .children
            .get(segment)
            .unwrap_or_else(|| panic!("no child '{}' under {}", segment, ctx.arena.path(at)));
    }
    at
}

fn entity_in(expr: &Expr) -> EntityId {
    match expr {
        Expr::Ref(reference) => reference.entity().expect("unresolved reference"),
        other => panic!("expected reference, got {:?}", other),
    }
}

#[test]
fn process_when_arguments_then_set_get_and_args_struct_minted() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "motion.json",
        json!({
            "library": { "name": "motion", "items": [
                { "PROCESS": { "name": "MoveAxis",
                               "arguments": [ { "name": "speed", "type": "t_double" } ] } }
            ] }
        }),
    );

    let process = descend(&ctx, lib, &["MoveAxis"]);
    // set/get expose the argument through the minted struct type.
    descend(&ctx, process, &["set", "speed"]);
    descend(&ctx, process, &["get", "speed"]);
    // The struct is registered in the library's Processes.Args namespace.
    descend(&ctx, lib, &["Processes", "Args", "MoveAxisArgs"]);
}

#[test]
fn process_request_when_disabled_then_rejected_without_side_effect() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "motion.json",
        json!({
            "library": { "name": "motion", "items": [
                { "PROCESS": { "name": "MoveAxis",
                               "arguments": [ { "name": "speed", "type": "t_double" } ] } }
            ] }
        }),
    );

    let process = descend(&ctx, lib, &["MoveAxis"]);
    let request = descend(&ctx, process, &["request"]);
    let enabled = descend(&ctx, process, &["statuses", "enabledStatus", "enabled"]);

    let body = match ctx.arena.get(request).kind.method() {
        Some(method) => &method.implementation,
        None => panic!("expected method"),
    };
    let gate = match &body[..] {
        [Stmt::If(gate)] => gate,
        other => panic!("expected single IF, got {:?}", other),
    };
    assert_eq!(entity_in(&gate.condition), enabled);

    // Accepted: assign the result, then start with the same arguments.
    match &gate.then_body[..] {
        [Stmt::Assign(result), Stmt::Call(start_call)] => {
            assert_eq!(entity_in(&result.target), request);
            assert!(ctx.arena.path(entity_in(&result.value)).ends_with("RequestResults.ACCEPTED"));
            assert_eq!(start_call.assignments.len(), 1);
        }
        other => panic!("unexpected then branch {:?}", other),
    }
    // Rejected: assign the result and nothing else; get stays untouched.
    match &gate.else_body[..] {
        [Stmt::Assign(result)] => {
            assert!(ctx.arena.path(entity_in(&result.value)).ends_with("RequestResults.REJECTED"));
        }
        other => panic!("unexpected else branch {:?}", other),
    }
}

#[test]
fn process_start_when_accepted_then_records_arguments_and_marks_status() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "motion.json",
        json!({
            "library": { "name": "motion", "items": [
                { "PROCESS": { "name": "MoveAxis",
                               "arguments": [ { "name": "speed", "type": "t_double" } ] } }
            ] }
        }),
    );

    let process = descend(&ctx, lib, &["MoveAxis"]);
    let start = descend(&ctx, process, &["start"]);
    let get_speed = descend(&ctx, process, &["get", "speed"]);
    let is_busy = descend(&ctx, process, &["statuses", "busyStatus", "isBusy"]);
    let is_good = descend(&ctx, process, &["statuses", "healthStatus", "isGood"]);

    let body = match ctx.arena.get(start).kind.method() {
        Some(method) => &method.implementation,
        None => panic!("expected method"),
    };
    match &body[..] {
        [Stmt::Assign(record_arg), Stmt::Call(set_busy), Stmt::Call(set_good)] => {
            assert_eq!(entity_in(&record_arg.target), get_speed);
            assert_eq!(entity_in(&set_busy.assignments[0].target), is_busy);
            assert_eq!(
                set_busy.assignments[0].value,
                Expr::Literal(Literal::Bool(true))
            );
            assert_eq!(entity_in(&set_good.assignments[0].target), is_good);
        }
        other => panic!("unexpected start body {:?}", other),
    }
}

#[test]
fn process_body_when_built_then_one_shot_dispatch_and_super_call() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "motion.json",
        json!({
            "library": { "name": "motion", "items": [
                { "PROCESS": { "name": "MoveAxis",
                               "arguments": [ { "name": "speed", "type": "t_double" } ] } }
            ] }
        }),
    );

    let process = descend(&ctx, lib, &["MoveAxis"]);
    let do_request = descend(&ctx, process, &["do_request"]);
    let result_var = descend(&ctx, process, &["do_request_result"]);

    let body = match ctx.arena.get(process).kind.function_block() {
        Some(fb) => &fb.implementation,
        None => panic!("expected function block payload"),
    };
    match &body[..] {
        [Stmt::If(dispatch), Stmt::Call(super_call)] => {
            assert_eq!(entity_in(&dispatch.condition), do_request);
            match &dispatch.then_body[..] {
                [Stmt::Assign(store), Stmt::Assign(clear)] => {
                    assert_eq!(entity_in(&store.target), result_var);
                    assert!(matches!(store.value, Expr::Invoke(_)));
                    assert_eq!(entity_in(&clear.target), do_request);
                    assert_eq!(clear.value, Expr::Literal(Literal::Bool(false)));
                }
                other => panic!("unexpected dispatch {:?}", other),
            }
            assert!(dispatch.else_body.is_empty());
            match &super_call.calls {
                Some(Expr::Unary(unary)) => assert_eq!(unary.op, Operator::Deref),
                other => panic!("expected dereferenced SUPER, got {:?}", other),
            }
        }
        other => panic!("unexpected process body {:?}", other),
    }
}

#[test]
fn statemachine_when_disabled_call_then_wired_calls_skip_it() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "FB": { "name": "Drive",
                          "in": [ { "name": "enable", "type": "t_bool" } ] } },
                { "STATEMACHINE": { "name": "Axis",
                                    "parts": [
                                        { "name": "p1", "type": "Drive" },
                                        { "name": "p2", "type": "Drive" } ],
                                    "disabled_calls": ["p2"] } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let p1 = descend(&ctx, sm, &["parts", "p1"]);

    let body = match ctx.arena.get(sm).kind.function_block() {
        Some(fb) => &fb.implementation,
        None => panic!("expected function block payload"),
    };
    match &body[..] {
        [Stmt::Call(only)] => {
            assert_eq!(only.callee.entity(), Some(p1));
            assert_eq!(only.name.as_str(), "call_p1");
        }
        other => panic!("expected exactly one wired call, got {:?}", other),
    }
}

#[test]
fn statemachine_when_built_then_shadow_instance_extends_base_unrendered() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "STATEMACHINE": { "name": "Axis" } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let shadow = descend(&ctx, lib, &["Axis"]);
    let fb = ctx.arena.get(shadow).kind.function_block().unwrap();
    assert!(!fb.render);
    assert_eq!(fb.extends.as_ref().unwrap().entity(), Some(sm));
    // The shadow inherits the synthesized interface.
    descend(&ctx, shadow, &["actualStatus"]);
    descend(&ctx, shadow, &["_log"]);
}

#[test]
fn statemachine_log_when_synthesized_then_logger_first_then_children() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "FB": { "name": "Drive" } },
                { "PROCESS": { "name": "Park" } },
                { "STATEMACHINE": { "name": "Axis",
                                    "statuses": [
                                        { "name": "healthStatus", "type": "common.HealthStatus" },
                                        { "name": "busyStatus", "type": "common.BusyStatus" } ],
                                    "parts": [ { "name": "drive", "type": "Drive" } ],
                                    "processes": [
                                        { "name": "park", "type": "Park",
                                          "comment": "Park the axis" } ] } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let log = descend(&ctx, sm, &["_log"]);
    let body = match ctx.arena.get(log).kind.method() {
        Some(method) => &method.implementation,
        None => panic!("expected method"),
    };

    match &body[..] {
        [Stmt::Call(logger), Stmt::Call(drive), Stmt::Call(park)] => {
            assert_eq!(logger.callee.entity(), Some(ctx.logger));
            // Health and busy pointers are attached because both
            // statuses exist.
            assert!(logger.assignments.iter().any(|a| matches!(
                &a.value,
                Expr::Unary(unary) if unary.op == Operator::Adr
            )));
            assert_eq!(
                drive.assignments[0].value,
                Expr::Literal(Literal::string("drive"))
            );
            assert_eq!(
                park.assignments[0].value,
                Expr::Literal(Literal::string("processes.park"))
            );
        }
        other => panic!("unexpected _log body {:?}", other),
    }
}

#[test]
fn statemachine_when_processes_declared_then_forwarding_method_calls_request() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "PROCESS": { "name": "Move",
                               "arguments": [ { "name": "speed", "type": "t_double" } ] } },
                { "STATEMACHINE": { "name": "Axis",
                                    "processes": [
                                        { "name": "move", "type": "Move",
                                          "comment": "Move the axis" } ] } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let method = descend(&ctx, sm, &["move"]);
    // The forwarding method mirrors the request signature.
    descend(&ctx, method, &["speed"]);

    let member_request = descend(&ctx, sm, &["processes", "move", "request"]);
    let body = match ctx.arena.get(method).kind.method() {
        Some(payload) => &payload.implementation,
        None => panic!("expected method"),
    };
    match &body[..] {
        [Stmt::Assign(assign)] => {
            assert_eq!(entity_in(&assign.target), method);
            match &assign.value {
                Expr::Invoke(call) => {
                    assert_eq!(
                        call.calls.as_ref().map(entity_in),
                        Some(member_request)
                    );
                    assert_eq!(call.assignments.len(), 1);
                }
                other => panic!("expected invocation, got {:?}", other),
            }
        }
        other => panic!("unexpected forwarding body {:?}", other),
    }
}

#[test]
fn statemachine_when_calls_directive_then_bindings_attached_in_order() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "FB": { "name": "Drive",
                          "in": [ { "name": "enable", "type": "t_bool" } ] } },
                { "STATEMACHINE": { "name": "Axis",
                                    "references": [ { "name": "io", "type": "Drive" } ],
                                    "calls": [
                                        { "name": "io",
                                          "assigns": [
                                              { "target": "enable",
                                                "value": { "BOOL": "TRUE" } } ] } ] } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let io = descend(&ctx, sm, &["io"]);
    let enable = descend(&ctx, io, &["enable"]);

    let body = match ctx.arena.get(sm).kind.function_block() {
        Some(fb) => &fb.implementation,
        None => panic!("expected function block payload"),
    };
    match &body[..] {
        [Stmt::Call(call)] => {
            assert_eq!(call.callee.entity(), Some(io));
            assert_eq!(entity_in(&call.assignments[0].target), enable);
            assert_eq!(
                call.assignments[0].value,
                Expr::Literal(Literal::Bool(true))
            );
        }
        other => panic!("unexpected wiring {:?}", other),
    }
}

#[test]
fn statemachine_when_extends_then_super_called_after_own_wiring() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "FB": { "name": "Drive" } },
                { "STATEMACHINE": { "name": "Base",
                                    "parts": [ { "name": "drive", "type": "Drive" } ] } },
                { "STATEMACHINE": { "name": "Axis", "extends": "SM_Base" } }
            ] }
        }),
    );

    let sm = descend(&ctx, lib, &["SM_Axis"]);
    let body = match ctx.arena.get(sm).kind.function_block() {
        Some(fb) => &fb.implementation,
        None => panic!("expected function block payload"),
    };
    match body.last() {
        Some(Stmt::Call(super_call)) => {
            assert_eq!(super_call.name.as_str(), "call_SUPER");
            match &super_call.calls {
                Some(Expr::Unary(unary)) => assert_eq!(unary.op, Operator::Deref),
                other => panic!("expected dereferenced SUPER, got {:?}", other),
            }
        }
        other => panic!("expected SUPER call last, got {:?}", other),
    }
}

#[test]
fn collection_queries_when_library_built_then_find_entities_once() {
    let mut ctx = context_with_common();
    let lib = build(
        &mut ctx,
        "axes.json",
        json!({
            "library": { "name": "axes", "items": [
                { "ENUMERATION": { "name": "Mode", "items": ["IDLE", "RUN"] } },
                { "STRUCT": { "name": "AxisConfig",
                              "items": [ { "name": "maxSpeed", "type": "t_double" } ] } },
                { "FB": { "name": "Drive" } },
                { "STATEMACHINE": { "name": "Axis",
                                    "parts": [ { "name": "drive", "type": "Drive" } ] } }
            ] }
        }),
    );

    let enums = ctx.arena.enums_below(lib);
    assert_eq!(enums.len(), 1);
    assert_eq!(ctx.arena.get(enums[0]).name.as_str(), "Mode");

    // AxisConfig plus the minted AxisParts struct, each found once even
    // though they are reachable both directly and through a namespace.
    let structs = ctx.arena.structs_below(lib);
    let mut names: Vec<_> = structs
        .iter()
        .map(|id| ctx.arena.get(*id).name.as_str().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["AxisConfig", "AxisParts"]);

    // Drive, the state machine base and its shadow instance.
    let fbs = ctx.arena.function_blocks_below(lib);
    assert_eq!(fbs.len(), 3);
}

#[test]
fn config_when_declared_then_registered_under_configs() {
    let mut ctx = BuildContext::new().unwrap();
    let lib = build(
        &mut ctx,
        "cfg.json",
        json!({
            "library": { "name": "cfg", "items": [
                { "CONFIG": { "name": "AxisSettings",
                              "items": [ { "name": "limit", "type": "t_double" } ] } }
            ] }
        }),
    );
    let config = descend(&ctx, lib, &["Configs", "AxisSettings"]);
    assert!(matches!(ctx.arena.get(config).kind, EntityKind::Config(_)));
}
