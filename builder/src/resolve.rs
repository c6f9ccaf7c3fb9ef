//! Reference resolution.
//!
//! A dotted path `a.b.c` resolves recursively: the first segment is
//! looked up as a child reachable by walking up the context's ancestor
//! chain (each level checks only its own children), falling back to the
//! registry; the remainder then resolves in the context of the entity
//! the first segment named. Resolution rewrites references in place, so
//! resolving an already-resolved reference is a no-op that returns the
//! same handle.

use log::trace;

use plcgen_dsl::arena::{EntityId, SymbolRef};
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::expr::{Assignment, Call, Expr, Stmt};
use plcgen_problems::Problem;

use crate::context::BuildContext;

/// Resolves a dotted path from a context entity to the entity it names.
pub fn lookup(
    ctx: &BuildContext,
    path: &str,
    context: Option<EntityId>,
) -> Result<EntityId, Diagnostic> {
    match path.split_once('.') {
        Some((head, rest)) => {
            let found = lookup(ctx, head, context)?;
            lookup(ctx, rest, Some(found))
        }
        None => {
            if let Some(start) = context {
                for ancestor in ctx.arena.ancestry(start) {
                    if let Some(child) = ctx.arena.get(ancestor).children.get(path) {
                        trace!("resolved '{}' under {}", path, ctx.arena.path(ancestor));
                        return Ok(child);
                    }
                }
            }
            if let Some(id) = ctx.registry.find(path) {
                return Ok(id);
            }
            Err(unresolved(ctx, path, context))
        }
    }
}

fn unresolved(ctx: &BuildContext, name: &str, context: Option<EntityId>) -> Diagnostic {
    let label = match context {
        Some(id) => Label::entity(
            ctx.arena.get(id).file_id.clone(),
            ctx.arena.path(id),
            format!("'{}' was not declared before", name),
        ),
        None => Label::file(
            plcgen_dsl::core::FileId::default(),
            format!("'{}' was not declared before", name),
        ),
    };
    Diagnostic::problem(Problem::UnresolvedReference, label)
}

/// Resolves a reference in place and returns the handle. Already
/// resolved references return their handle unchanged.
pub fn resolve_ref(
    ctx: &BuildContext,
    reference: &mut SymbolRef,
    context: EntityId,
) -> Result<EntityId, Diagnostic> {
    match reference {
        SymbolRef::Entity(id) => Ok(*id),
        SymbolRef::Named(path) => {
            let id = lookup(ctx, path, Some(context))?;
            *reference = SymbolRef::Entity(id);
            Ok(id)
        }
    }
}

/// Resolves every reference inside an expression tree, in place.
pub fn resolve_expr(
    ctx: &BuildContext,
    expr: &mut Expr,
    context: EntityId,
) -> Result<(), Diagnostic> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Ref(reference) => resolve_ref(ctx, reference, context).map(|_| ()),
        Expr::Unary(unary) => resolve_expr(ctx, &mut unary.operand, context),
        Expr::Binary(binary) => {
            resolve_expr(ctx, &mut binary.left, context)?;
            resolve_expr(ctx, &mut binary.right, context)
        }
        Expr::Invoke(call) => resolve_call(ctx, call, context),
    }
}

fn resolve_call(ctx: &BuildContext, call: &mut Call, context: EntityId) -> Result<(), Diagnostic> {
    resolve_ref(ctx, &mut call.callee, context)?;
    if let Some(target) = &mut call.calls {
        resolve_expr(ctx, target, context)?;
    }
    for assignment in &mut call.assignments {
        resolve_assignment(ctx, assignment, context)?;
    }
    Ok(())
}

fn resolve_assignment(
    ctx: &BuildContext,
    assignment: &mut Assignment,
    context: EntityId,
) -> Result<(), Diagnostic> {
    resolve_expr(ctx, &mut assignment.target, context)?;
    resolve_expr(ctx, &mut assignment.value, context)
}

/// Resolves every reference in a statement sequence, in place.
pub fn resolve_stmts(
    ctx: &BuildContext,
    body: &mut [Stmt],
    context: EntityId,
) -> Result<(), Diagnostic> {
    for stmt in body {
        match stmt {
            Stmt::Assign(assignment) => resolve_assignment(ctx, assignment, context)?,
            Stmt::Call(call) => resolve_call(ctx, call, context)?,
            Stmt::If(if_then) => {
                resolve_expr(ctx, &mut if_then.condition, context)?;
                resolve_stmts(ctx, &mut if_then.then_body, context)?;
                resolve_stmts(ctx, &mut if_then.else_body, context)?;
            }
        }
    }
    Ok(())
}

/// A direct child, with an unresolved-reference diagnostic on absence.
pub fn child(ctx: &BuildContext, parent: EntityId, name: &str) -> Result<EntityId, Diagnostic> {
    ctx.arena
        .get(parent)
        .children
        .get(name)
        .ok_or_else(|| unresolved(ctx, name, Some(parent)))
}
