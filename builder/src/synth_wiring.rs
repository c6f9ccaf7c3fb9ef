//! Call-wiring synthesis for state machines.
//!
//! Every eligible member is invoked once per execution cycle: declared
//! variables listed under the `calls` directive first, then parts, then
//! statuses, then processes, each in declaration order and skipping
//! names in `disabled_calls`. A member's directive bindings become the
//! call's argument assignments. When the state machine extends, one
//! final call through the dereferenced SUPER pointer runs the inherited
//! behavior after this level's own wiring.

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::EntityKind;
use plcgen_dsl::expr::{Call, Expr, Operator, Stmt};
use plcgen_dsl::records::{CallDirectiveRecord, StatemachineRecord};

use crate::context::BuildContext;
use crate::expressions::build_expr;
use crate::resolve::{child, resolve_stmts};

pub(crate) fn wire(
    ctx: &mut BuildContext,
    sm: EntityId,
    record: &StatemachineRecord,
    interface_vars: &[(String, EntityId)],
    file_id: &FileId,
) -> Result<(), Diagnostic> {
    let directive = |name: &str| -> Option<&CallDirectiveRecord> {
        record.calls.iter().find(|d| d.name == name)
    };
    let disabled = |name: &str| record.disabled_calls.iter().any(|d| d == name);

    let (parts, statuses, processes) = match &ctx.arena.get(sm).kind {
        EntityKind::Statemachine(payload) => (
            payload.parts.clone(),
            payload.statuses.clone(),
            payload.processes.clone(),
        ),
        _ => (vec![], vec![], vec![]),
    };

    let mut called: Vec<(String, EntityId)> = vec![];
    for (name, var) in interface_vars {
        if directive(name).is_some() && !disabled(name) {
            called.push((name.clone(), *var));
        }
    }
    for members in [&parts, &statuses, &processes] {
        for (name, member) in members {
            if !disabled(name.as_str()) {
                called.push((name.as_str().to_string(), *member));
            }
        }
    }

    let mut body = vec![];
    for (name, target) in called {
        let mut call = Call::to(&format!("call_{}", name), target);
        if let Some(directive) = directive(&name) {
            for binding in &directive.assigns {
                let slot = child(ctx, target, &binding.target)?;
                let value = build_expr(&binding.value, file_id)?;
                call = call.with_assignment(Expr::entity(slot), value);
            }
        }
        body.push(Stmt::Call(call));
    }

    let super_ptr = ctx
        .arena
        .get(sm)
        .kind
        .function_block()
        .and_then(|fb| fb.super_ptr);
    if let Some(super_ptr) = super_ptr {
        body.push(Stmt::Call(
            Call::to("call_SUPER", super_ptr)
                .with_target(Expr::unary_of(Operator::Deref, Expr::entity(super_ptr))),
        ));
    }

    resolve_stmts(ctx, &mut body, sm)?;
    if let Some(fb) = ctx.arena.get_mut(sm).kind.function_block_mut() {
        fb.implementation.extend(body);
    }
    Ok(())
}
