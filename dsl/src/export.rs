//! JSON export of a finished model.
//!
//! External template renderers consume this view: one JSON object per
//! entity with its kind, dotted path, kind-specific attributes, ordered
//! children and implementation statements. References are exported as the
//! dotted path of the entity they resolve to.

use serde_json::{json, Map, Value};

use crate::arena::{Arena, EntityId, SymbolRef};
use crate::entity::{EntityKind, FunctionBlock, Method, Variable};
use crate::expr::{Assignment, Call, Expr, IfThen, Stmt};
use crate::literal::Literal;

/// Exports the entity and everything below it.
pub fn export(arena: &Arena, id: EntityId) -> Value {
    let entity = arena.get(id);
    let mut out = Map::new();
    out.insert("name".into(), json!(entity.name.as_str()));
    out.insert("kind".into(), json!(entity.kind.describe()));
    out.insert("path".into(), json!(arena.path(id)));

    match &entity.kind {
        EntityKind::Primitive(primitive) => {
            out.insert("symbol".into(), json!(primitive.symbol));
        }
        EntityKind::Enum(en) => {
            out.insert("type".into(), opt_ref(arena, &en.underlying));
            out.insert("comment".into(), json!(en.comment));
        }
        EntityKind::EnumItem(item) => {
            out.insert("ordinal".into(), json!(item.ordinal));
        }
        EntityKind::Variable(var) => {
            variable_fields(arena, var, &mut out);
        }
        EntityKind::Pointer(pointer) => {
            variable_fields(arena, &pointer.base, &mut out);
            out.insert("pointsTo".into(), opt_ref(arena, &pointer.points_to));
        }
        EntityKind::Struct(st) | EntityKind::Config(st) => {
            out.insert("comment".into(), json!(st.comment));
            let items: Vec<Value> = st
                .items
                .iter()
                .map(|item| json!(arena.get(*item).name.as_str()))
                .collect();
            out.insert("items".into(), json!(items));
        }
        EntityKind::Method(method) => {
            method_fields(arena, method, &mut out);
        }
        EntityKind::FunctionBlock(fb) | EntityKind::Status(fb) => {
            function_block_fields(arena, fb, &mut out);
        }
        EntityKind::Statemachine(sm) => {
            function_block_fields(arena, &sm.base, &mut out);
        }
        EntityKind::Process(process) => {
            function_block_fields(arena, &process.base, &mut out);
        }
        EntityKind::Namespace | EntityKind::Library(_) => {}
    }

    let children: Vec<Value> = entity
        .children
        .iter()
        .map(|(_, child)| export(arena, child))
        .collect();
    out.insert("children".into(), json!(children));

    Value::Object(out)
}

fn variable_fields(arena: &Arena, var: &Variable, out: &mut Map<String, Value>) {
    out.insert("type".into(), opt_ref(arena, &var.ty));
    out.insert("pointsToType".into(), opt_ref(arena, &var.points_to_type));
    out.insert(
        "initial".into(),
        var.initial.as_ref().map(literal).unwrap_or(Value::Null),
    );
    out.insert("comment".into(), json!(var.comment));
    out.insert("address".into(), json!(var.address));
    let qualifiers: Vec<Value> = var
        .qualifiers
        .iter()
        .map(|q| json!({ "symbol": q.symbol(), "value": q.value() }))
        .collect();
    out.insert("qualifiers".into(), json!(qualifiers));
}

fn method_fields(arena: &Arena, method: &Method, out: &mut Map<String, Value>) {
    out.insert("comment".into(), json!(method.comment));
    out.insert("in".into(), names(arena, &method.var_in));
    out.insert("inout".into(), names(arena, &method.var_inout));
    out.insert("local".into(), names(arena, &method.var_local));
    out.insert("returnType".into(), opt_ref(arena, &method.return_type));
    out.insert(
        "implementation".into(),
        statements(arena, &method.implementation),
    );
}

fn function_block_fields(arena: &Arena, fb: &FunctionBlock, out: &mut Map<String, Value>) {
    out.insert("comment".into(), json!(fb.comment));
    out.insert("render".into(), json!(fb.render));
    out.insert("extends".into(), opt_ref(arena, &fb.extends));
    out.insert("in".into(), names(arena, &fb.var_in));
    out.insert("out".into(), names(arena, &fb.var_out));
    out.insert("inout".into(), names(arena, &fb.var_inout));
    out.insert("local".into(), names(arena, &fb.var_local));
    out.insert("methods".into(), names(arena, &fb.methods));
    out.insert(
        "implementation".into(),
        statements(arena, &fb.implementation),
    );
}

fn names(arena: &Arena, ids: &[EntityId]) -> Value {
    let names: Vec<Value> = ids
        .iter()
        .map(|id| json!(arena.get(*id).name.as_str()))
        .collect();
    json!(names)
}

fn opt_ref(arena: &Arena, reference: &Option<SymbolRef>) -> Value {
    reference
        .as_ref()
        .map(|r| symbol_ref(arena, r))
        .unwrap_or(Value::Null)
}

fn symbol_ref(arena: &Arena, reference: &SymbolRef) -> Value {
    match reference {
        SymbolRef::Named(path) => json!(path),
        SymbolRef::Entity(id) => json!(arena.path(*id)),
    }
}

fn literal(value: &Literal) -> Value {
    match value {
        Literal::Bool(b) => json!(b),
        Literal::Int8(v) => json!(v),
        Literal::UInt8(v) => json!(v),
        Literal::Int16(v) => json!(v),
        Literal::UInt16(v) => json!(v),
        Literal::Double(v) => json!(v),
        Literal::Str(s) => json!(s),
    }
}

fn statements(arena: &Arena, body: &[Stmt]) -> Value {
    let out: Vec<Value> = body.iter().map(|stmt| statement(arena, stmt)).collect();
    json!(out)
}

fn statement(arena: &Arena, stmt: &Stmt) -> Value {
    match stmt {
        Stmt::Assign(assign) => assignment(arena, assign),
        Stmt::Call(call) => call_stmt(arena, call),
        Stmt::If(if_then) => if_stmt(arena, if_then),
    }
}

fn assignment(arena: &Arena, assign: &Assignment) -> Value {
    json!({
        "assign": {
            "target": expression(arena, &assign.target),
            "value": expression(arena, &assign.value),
        }
    })
}

fn call_stmt(arena: &Arena, call: &Call) -> Value {
    let assignments: Vec<Value> = call
        .assignments
        .iter()
        .map(|assign| assignment(arena, assign))
        .collect();
    json!({
        "call": {
            "name": call.name.as_str(),
            "callee": symbol_ref(arena, &call.callee),
            "calls": call.calls.as_ref().map(|target| expression(arena, target)),
            "assignments": assignments,
        }
    })
}

fn if_stmt(arena: &Arena, if_then: &IfThen) -> Value {
    json!({
        "if": {
            "condition": expression(arena, &if_then.condition),
            "then": statements(arena, &if_then.then_body),
            "else": statements(arena, &if_then.else_body),
        }
    })
}

fn expression(arena: &Arena, expr: &Expr) -> Value {
    match expr {
        Expr::Literal(value) => literal(value),
        Expr::Ref(reference) => json!({ "ref": symbol_ref(arena, reference) }),
        Expr::Unary(unary) => json!({
            "op": unary.op.symbol(),
            "operand": expression(arena, &unary.operand),
        }),
        Expr::Binary(binary) => json!({
            "op": binary.op.symbol(),
            "left": expression(arena, &binary.left),
            "right": expression(arena, &binary.right),
        }),
        Expr::Invoke(call) => call_stmt(arena, call),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileId, Id};
    use crate::entity::Entity;

    #[test]
    fn export_when_variable_then_type_is_dotted_path() {
        let mut arena = Arena::new();
        let root = arena.alloc(Entity::new(
            Id::from("lib"),
            None,
            FileId::default(),
            EntityKind::Namespace,
        ));
        let target = arena.alloc(Entity::new(
            Id::from("t_double"),
            None,
            FileId::builtin(),
            EntityKind::Primitive(crate::entity::Primitive {
                symbol: Some("LREAL"),
            }),
        ));
        let var = arena.alloc(Entity::new(
            Id::from("speed"),
            Some(root),
            FileId::default(),
            EntityKind::Variable(Variable {
                ty: Some(SymbolRef::Entity(target)),
                ..Variable::default()
            }),
        ));
        arena.get_mut(root).children.insert(Id::from("speed"), var);

        let value = export(&arena, root);
        assert_eq!(value["children"][0]["type"], json!("t_double"));
        assert_eq!(value["children"][0]["path"], json!("lib.speed"));
    }
}
