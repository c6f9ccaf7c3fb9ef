//! The statement and expression algebra used in implementation sequences.
//!
//! Operations accept operand lists at the boundary: unary operators take
//! exactly one operand and n-ary operators take two or more, folding into
//! a right-nested binary tree. Anything else is an arity violation at
//! construction, before the expression reaches the model.

use thiserror::Error;

use crate::arena::SymbolRef;
use crate::core::Id;
use crate::literal::Literal;

/// Operator of an expression, with the wire symbol the renderer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Abs,
    Sum,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    And,
    Or,
    Not,
    Adr,
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
    Deref,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Assign => ":=",
            Operator::Abs => "ABS",
            Operator::Sum => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "POW",
            Operator::Neg => "-",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Adr => "ADR",
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Deref => "^",
        }
    }

    /// True for operators that take exactly one operand.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Operator::Not | Operator::Adr | Operator::Deref | Operator::Neg | Operator::Abs
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("{op} requires exactly 1 operand, not {actual}")]
    UnaryArity { op: &'static str, actual: usize },
    #[error("{op} requires at least 2 operands, not {actual}")]
    NaryArity { op: &'static str, actual: usize },
    #[error("IF requires a non-empty THEN sequence")]
    EmptyThen,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// A reference to an entity, by path until resolved.
    Ref(SymbolRef),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    /// A call in value position; the result of the invocation is the
    /// value (a request result stored by an assignment).
    Invoke(Box<Call>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub op: Operator,
    pub operand: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: Operator,
    pub left: Expr,
    pub right: Expr,
}

impl Expr {
    pub fn reference(path: &str) -> Expr {
        Expr::Ref(SymbolRef::named(path))
    }

    pub fn entity(id: impl Into<SymbolRef>) -> Expr {
        Expr::Ref(id.into())
    }

    /// Builds a unary operation, checking arity.
    pub fn unary(op: Operator, mut operands: Vec<Expr>) -> Result<Expr, ExprError> {
        if operands.len() != 1 {
            return Err(ExprError::UnaryArity {
                op: op.symbol(),
                actual: operands.len(),
            });
        }
        Ok(Expr::unary_of(op, operands.remove(0)))
    }

    /// Wraps a single operand without an arity check, for synthesized
    /// statements that construct the operand directly.
    pub fn unary_of(op: Operator, operand: Expr) -> Expr {
        Expr::Unary(Box::new(UnaryExpr { op, operand }))
    }

    pub fn binary(op: Operator, left: Expr, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryExpr { op, left, right }))
    }

    /// Builds an n-ary operation as a right-nested binary tree:
    /// `[a, b, c, d]` becomes `a op (b op (c op d))`.
    pub fn nary(op: Operator, mut operands: Vec<Expr>) -> Result<Expr, ExprError> {
        if operands.len() < 2 {
            return Err(ExprError::NaryArity {
                op: op.symbol(),
                actual: operands.len(),
            });
        }
        let mut expr = match operands.pop() {
            Some(last) => last,
            None => unreachable!("length checked above"),
        };
        while let Some(left) = operands.pop() {
            expr = Expr::binary(op, left, expr);
        }
        Ok(expr)
    }

    pub fn invoke(call: Call) -> Expr {
        Expr::Invoke(Box::new(call))
    }

    /// Depth of the expression tree. One for leaves.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Ref(_) | Expr::Invoke(_) => 1,
            Expr::Unary(unary) => 1 + unary.operand.depth(),
            Expr::Binary(binary) => 1 + binary.left.depth().max(binary.right.depth()),
        }
    }
}

/// The status-summary operators: each combines a fixed status field of
/// every referenced sub-entity with a fixed operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Summary {
    /// OR over `.statuses.busyStatus.busy`.
    AnyBusy,
    /// AND over `.statuses.healthStatus.isGood`.
    AllGood,
    /// OR over `.statuses.healthStatus.hasWarning`.
    AnyWarning,
    /// AND over OR(`.statuses.healthStatus.isGood`,
    /// `.statuses.enabledStatus.disabled`).
    EachGoodOrDisabled,
}

/// Expands a summary over the referenced sub-entities' status fields.
pub fn summarize(kind: Summary, operands: &[String]) -> Result<Expr, ExprError> {
    let suffixed = |suffix: &str| {
        operands
            .iter()
            .map(|path| Expr::reference(&format!("{}{}", path, suffix)))
            .collect::<Vec<_>>()
    };
    match kind {
        Summary::AnyBusy => Expr::nary(Operator::Or, suffixed(".statuses.busyStatus.busy")),
        Summary::AllGood => Expr::nary(Operator::And, suffixed(".statuses.healthStatus.isGood")),
        Summary::AnyWarning => Expr::nary(
            Operator::Or,
            suffixed(".statuses.healthStatus.hasWarning"),
        ),
        Summary::EachGoodOrDisabled => {
            let pairs = operands
                .iter()
                .map(|path| {
                    Expr::binary(
                        Operator::Or,
                        Expr::reference(&format!("{}.statuses.healthStatus.isGood", path)),
                        Expr::reference(&format!("{}.statuses.enabledStatus.disabled", path)),
                    )
                })
                .collect();
            Expr::nary(Operator::And, pairs)
        }
    }
}

/// One statement in an implementation sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign(Assignment),
    Call(Call),
    If(IfThen),
}

impl Stmt {
    pub fn assign(target: Expr, value: Expr) -> Stmt {
        Stmt::Assign(Assignment { target, value })
    }
}

/// Assigns the evaluation of an expression to a target.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub target: Expr,
    pub value: Expr,
}

/// Invocation of a callable member.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: Id,
    /// The member being invoked.
    pub callee: SymbolRef,
    /// Explicit target override; when set the renderer invokes this
    /// expression instead of the callee itself (a method of the callee,
    /// a dereferenced pointer).
    pub calls: Option<Expr>,
    /// Argument bindings executed around the call, in order.
    pub assignments: Vec<Assignment>,
}

impl Call {
    pub fn to(name: &str, callee: impl Into<SymbolRef>) -> Call {
        Call {
            name: Id::from(name),
            callee: callee.into(),
            calls: None,
            assignments: vec![],
        }
    }

    pub fn with_target(mut self, target: Expr) -> Call {
        self.calls = Some(target);
        self
    }

    pub fn with_assignment(mut self, target: Expr, value: Expr) -> Call {
        self.assignments.push(Assignment { target, value });
        self
    }
}

/// If-then-else over statement sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct IfThen {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Vec<Stmt>,
}

impl IfThen {
    pub fn new(
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    ) -> Result<IfThen, ExprError> {
        if then_body.is_empty() {
            return Err(ExprError::EmptyThen);
        }
        Ok(IfThen {
            condition,
            then_body,
            else_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unary_when_one_operand_then_builds() {
        let expr = Expr::unary(Operator::Not, vec![Expr::reference("enabled")]).unwrap();
        assert_eq!(expr.depth(), 2);
    }

    #[test]
    fn unary_when_zero_or_two_operands_then_arity_violation() {
        assert_eq!(
            Expr::unary(Operator::Not, vec![]),
            Err(ExprError::UnaryArity {
                op: "NOT",
                actual: 0
            })
        );
        let operands = vec![Expr::reference("a"), Expr::reference("b")];
        assert!(Expr::unary(Operator::Adr, operands).is_err());
    }

    #[test]
    fn nary_when_fewer_than_two_operands_then_arity_violation() {
        assert!(Expr::nary(Operator::And, vec![]).is_err());
        assert!(Expr::nary(Operator::And, vec![Expr::reference("a")]).is_err());
    }

    #[test]
    fn nary_when_three_operands_then_right_nested() {
        let expr = Expr::nary(
            Operator::Sum,
            vec![
                Expr::reference("a"),
                Expr::reference("b"),
                Expr::reference("c"),
            ],
        )
        .unwrap();

        // a + (b + c)
        match expr {
            Expr::Binary(outer) => {
                assert_eq!(outer.left, Expr::reference("a"));
                match outer.right {
                    Expr::Binary(inner) => {
                        assert_eq!(inner.left, Expr::reference("b"));
                        assert_eq!(inner.right, Expr::reference("c"));
                    }
                    other => panic!("expected nested binary, got {:?}", other),
                }
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn summarize_when_any_busy_then_or_over_busy_fields() {
        let expr = summarize(Summary::AnyBusy, &["p1".to_string(), "p2".to_string()]).unwrap();
        match expr {
            Expr::Binary(binary) => {
                assert_eq!(binary.op, Operator::Or);
                assert_eq!(
                    binary.left,
                    Expr::reference("p1.statuses.busyStatus.busy")
                );
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn summarize_when_good_or_disabled_then_inner_or_per_operand() {
        let expr = summarize(
            Summary::EachGoodOrDisabled,
            &["p1".to_string(), "p2".to_string()],
        )
        .unwrap();
        match expr {
            Expr::Binary(outer) => {
                assert_eq!(outer.op, Operator::And);
                match outer.left {
                    Expr::Binary(inner) => assert_eq!(inner.op, Operator::Or),
                    other => panic!("expected inner OR, got {:?}", other),
                }
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn if_then_when_empty_then_body_then_error() {
        assert_eq!(
            IfThen::new(Expr::reference("go"), vec![], vec![]).unwrap_err(),
            ExprError::EmptyThen
        );
    }

    proptest! {
        #[test]
        fn nary_when_n_operands_then_depth_is_n(n in 2usize..40) {
            let operands = (0..n).map(|i| Expr::reference(&format!("v{i}"))).collect();
            let expr = Expr::nary(Operator::Or, operands).unwrap();
            // A right-nested chain of n - 1 binary nodes over depth-1
            // leaves measures n deep in total.
            prop_assert_eq!(expr.depth(), n);
        }
    }
}
