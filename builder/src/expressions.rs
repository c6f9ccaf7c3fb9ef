//! Converts expression records into the expression algebra.
//!
//! Arity and literal validation happen here, before the expression enters
//! an implementation sequence; reference resolution happens later, with
//! the owning entity as context.

use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::{Diagnostic, Label};
use plcgen_dsl::expr::{summarize, Expr, ExprError, Operator, Summary};
use plcgen_dsl::literal::{Literal, LiteralError};
use plcgen_dsl::records::{ExprRecord, OpRecord};
use plcgen_problems::Problem;

/// Builds an expression from its record.
pub fn build_expr(record: &ExprRecord, file_id: &FileId) -> Result<Expr, Diagnostic> {
    match record {
        ExprRecord::Bool(value) => Ok(Expr::Literal(Literal::Bool(*value))),
        ExprRecord::Number(value) => Ok(Expr::Literal(Literal::Double(*value))),
        ExprRecord::Path(path) => Ok(Expr::reference(path)),
        ExprRecord::Op(op) => build_op(op, file_id),
    }
}

fn build_op(op: &OpRecord, file_id: &FileId) -> Result<Expr, Diagnostic> {
    let nary = |operator: Operator, operands: &[ExprRecord]| {
        let operands = operands
            .iter()
            .map(|operand| build_expr(operand, file_id))
            .collect::<Result<Vec<_>, _>>()?;
        Expr::nary(operator, operands).map_err(|e| arity(e, file_id))
    };
    let unary = |operator: Operator, operands: &[ExprRecord]| {
        let operands = operands
            .iter()
            .map(|operand| build_expr(operand, file_id))
            .collect::<Result<Vec<_>, _>>()?;
        Expr::unary(operator, operands).map_err(|e| arity(e, file_id))
    };
    let summary = |kind: Summary, operands: &[String]| {
        summarize(kind, operands).map_err(|e| arity(e, file_id))
    };

    match op {
        OpRecord::Assign(operands) => nary(Operator::Assign, operands),
        OpRecord::And(operands) => nary(Operator::And, operands),
        OpRecord::Or(operands) => nary(Operator::Or, operands),
        OpRecord::Eq(operands) => nary(Operator::Eq, operands),
        OpRecord::Gt(operands) => nary(Operator::Gt, operands),
        OpRecord::Lt(operands) => nary(Operator::Lt, operands),
        OpRecord::Ge(operands) => nary(Operator::Ge, operands),
        OpRecord::Le(operands) => nary(Operator::Le, operands),
        OpRecord::Sum(operands) => nary(Operator::Sum, operands),
        OpRecord::Sub(operands) => nary(Operator::Sub, operands),
        OpRecord::Mul(operands) => nary(Operator::Mul, operands),
        OpRecord::Div(operands) => nary(Operator::Div, operands),
        OpRecord::Pow(operands) => nary(Operator::Pow, operands),
        OpRecord::Not(operands) => unary(Operator::Not, operands),
        OpRecord::Adr(operands) => unary(Operator::Adr, operands),
        OpRecord::Deref(operands) => unary(Operator::Deref, operands),
        OpRecord::Neg(operands) => unary(Operator::Neg, operands),
        OpRecord::Abs(operands) => unary(Operator::Abs, operands),
        OpRecord::Bool(text) => literal(Literal::boolean(text), file_id),
        OpRecord::Int8(text) => literal(Literal::int8(text), file_id),
        OpRecord::UInt8(text) => literal(Literal::uint8(text), file_id),
        OpRecord::Int16(text) => literal(Literal::int16(text), file_id),
        OpRecord::UInt16(text) => literal(Literal::uint16(text), file_id),
        OpRecord::Double(text) => literal(Literal::double(text), file_id),
        OpRecord::Str(text) => Ok(Expr::Literal(Literal::string(text))),
        OpRecord::SummarizeBusy(operands) => summary(Summary::AnyBusy, operands),
        OpRecord::SummarizeGood(operands) => summary(Summary::AllGood, operands),
        OpRecord::SummarizeWarn(operands) => summary(Summary::AnyWarning, operands),
        OpRecord::SummarizeGoodOrDisabled(operands) => {
            summary(Summary::EachGoodOrDisabled, operands)
        }
    }
}

/// Builds the initial value of a variable: a literal, never a reference
/// or an operation.
pub fn build_initial(record: &ExprRecord, file_id: &FileId) -> Result<Literal, Diagnostic> {
    let expr = build_expr(record, file_id)?;
    match expr {
        Expr::Literal(value) => Ok(value),
        // A bare scalar decodes as a path; in initial position it is the
        // raw literal text.
        _ => match record {
            ExprRecord::Path(text) => Ok(Literal::string(text)),
            _ => Err(Diagnostic::problem(
                Problem::MalformedLiteral,
                Label::file(file_id.clone(), "initial value must be a literal"),
            )),
        },
    }
}

fn literal(result: Result<Literal, LiteralError>, file_id: &FileId) -> Result<Expr, Diagnostic> {
    result.map(Expr::Literal).map_err(|e| {
        Diagnostic::problem(Problem::MalformedLiteral, Label::file(file_id.clone(), e.to_string()))
    })
}

fn arity(error: ExprError, file_id: &FileId) -> Diagnostic {
    let problem = match error {
        ExprError::UnaryArity { .. } | ExprError::NaryArity { .. } => Problem::ArityViolation,
        ExprError::EmptyThen => Problem::SchemaViolation,
    };
    Diagnostic::problem(problem, Label::file(file_id.clone(), error.to_string()))
}
