//! Typed literal values.
//!
//! Each literal kind validates its textual value. Numeric literals that do
//! not parse directly are folded through the constant-arithmetic evaluator
//! before the value is rejected.

use std::fmt;

use thiserror::Error;

use crate::eval;

/// A validated literal of one of the primitive kinds documents may write.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Double(f64),
    Str(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("'{0}' is not TRUE or FALSE")]
    NotBoolean(String),
    #[error("'{text}' is not a valid {kind} value")]
    NotNumeric { kind: &'static str, text: String },
}

impl Literal {
    /// A boolean from `TRUE` or `FALSE` (case insensitive).
    pub fn boolean(text: &str) -> Result<Self, LiteralError> {
        match text.to_uppercase().as_str() {
            "TRUE" => Ok(Literal::Bool(true)),
            "FALSE" => Ok(Literal::Bool(false)),
            _ => Err(LiteralError::NotBoolean(text.to_string())),
        }
    }

    pub fn int8(text: &str) -> Result<Self, LiteralError> {
        match text.parse::<i8>() {
            Ok(value) => Ok(Literal::Int8(value)),
            Err(_) => integral(text, "INT8").map(|v| Literal::Int8(v as i8)),
        }
    }

    pub fn uint8(text: &str) -> Result<Self, LiteralError> {
        match text.parse::<u8>() {
            Ok(value) => Ok(Literal::UInt8(value)),
            Err(_) => integral(text, "UINT8").map(|v| Literal::UInt8(v as u8)),
        }
    }

    pub fn int16(text: &str) -> Result<Self, LiteralError> {
        match text.parse::<i16>() {
            Ok(value) => Ok(Literal::Int16(value)),
            Err(_) => integral(text, "INT16").map(|v| Literal::Int16(v as i16)),
        }
    }

    pub fn uint16(text: &str) -> Result<Self, LiteralError> {
        match text.parse::<u16>() {
            Ok(value) => Ok(Literal::UInt16(value)),
            Err(_) => integral(text, "UINT16").map(|v| Literal::UInt16(v as u16)),
        }
    }

    pub fn double(text: &str) -> Result<Self, LiteralError> {
        match text.parse::<f64>() {
            Ok(value) => Ok(Literal::Double(value)),
            Err(_) => match eval::evaluate(text) {
                Ok(value) if value.is_finite() => Ok(Literal::Double(value)),
                _ => Err(LiteralError::NotNumeric {
                    kind: "DOUBLE",
                    text: text.to_string(),
                }),
            },
        }
    }

    pub fn string(text: &str) -> Self {
        Literal::Str(text.to_string())
    }
}

/// Evaluates arithmetic text and requires a whole number within the range
/// checked by the caller's cast.
fn integral(text: &str, kind: &'static str) -> Result<f64, LiteralError> {
    let err = || LiteralError::NotNumeric {
        kind,
        text: text.to_string(),
    };
    let value = eval::evaluate(text).map_err(|_| err())?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(err());
    }
    let bounds = match kind {
        "INT8" => (i8::MIN as f64, i8::MAX as f64),
        "UINT8" => (u8::MIN as f64, u8::MAX as f64),
        "INT16" => (i16::MIN as f64, i16::MAX as f64),
        "UINT16" => (u16::MIN as f64, u16::MAX as f64),
        _ => (f64::MIN, f64::MAX),
    };
    if value < bounds.0 || value > bounds.1 {
        return Err(err());
    }
    Ok(value)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(true) => f.write_str("TRUE"),
            Literal::Bool(false) => f.write_str("FALSE"),
            Literal::Int8(value) => write!(f, "{}", value),
            Literal::UInt8(value) => write!(f, "{}", value),
            Literal::Int16(value) => write!(f, "{}", value),
            Literal::UInt16(value) => write!(f, "{}", value),
            Literal::Double(value) => write!(f, "{}", value),
            Literal::Str(value) => write!(f, "'{}'", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_when_mixed_case_then_parses() {
        assert_eq!(Literal::boolean("true"), Ok(Literal::Bool(true)));
        assert_eq!(Literal::boolean("FALSE"), Ok(Literal::Bool(false)));
    }

    #[test]
    fn boolean_when_other_text_then_error() {
        assert!(Literal::boolean("yes").is_err());
    }

    #[test]
    fn double_when_arithmetic_text_then_folds() {
        assert_eq!(Literal::double("3.0 * 2"), Ok(Literal::Double(6.0)));
    }

    #[test]
    fn uint8_when_arithmetic_in_range_then_folds() {
        assert_eq!(Literal::uint8("16 * 4"), Ok(Literal::UInt8(64)));
    }

    #[test]
    fn uint8_when_out_of_range_then_error() {
        assert!(Literal::uint8("16 * 64").is_err());
    }

    #[test]
    fn int16_when_fractional_result_then_error() {
        assert!(Literal::int16("5 / 2").is_err());
    }

    #[test]
    fn display_when_bool_then_plc_spelling() {
        assert_eq!(format!("{}", Literal::Bool(true)), "TRUE");
    }
}
