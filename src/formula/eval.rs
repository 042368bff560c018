use serde_json::Value;

use super::FormulaError;
use super::ast::*;
use crate::coerce::{format_number, parse_numeric_str};
use crate::metadata::FormData;

/// Value produced while evaluating a formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl FormulaValue {
    fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Number(_) => "number",
            FormulaValue::String(_) => "string",
            FormulaValue::Boolean(_) => "boolean",
        }
    }

    fn concat_text(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(b) => b.to_string(),
        }
    }

    /// Convert to JSON, writing integral numbers as integers
    pub fn into_json(self) -> Result<Value, FormulaError> {
        match self {
            FormulaValue::Number(n) if !n.is_finite() => Err(FormulaError::NonFinite),
            FormulaValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                Ok(Value::from(n as i64))
            }
            FormulaValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .ok_or(FormulaError::NonFinite),
            FormulaValue::String(s) => Ok(Value::String(s)),
            FormulaValue::Boolean(b) => Ok(Value::Bool(b)),
        }
    }
}

/// Resolve a bound form value the same way substituting its text into the
/// formula would read: numbers and numeric text as numbers, other text as a
/// string literal, booleans as booleans
fn resolve_binding(name: &str, bindings: &FormData) -> Result<FormulaValue, FormulaError> {
    match bindings.get(name) {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(FormulaValue::Number)
            .ok_or_else(|| FormulaError::Unresolvable(name.to_string())),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                return Err(FormulaError::Unresolvable(name.to_string()));
            }
            let number = parse_numeric_str(s);
            if number.is_nan() {
                Ok(FormulaValue::String(s.clone()))
            } else {
                Ok(FormulaValue::Number(number))
            }
        }
        Some(Value::Bool(b)) => Ok(FormulaValue::Boolean(*b)),
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) | None => {
            Err(FormulaError::Unresolvable(name.to_string()))
        }
    }
}

/// Evaluate an expression tree against form data
pub fn evaluate(expr: &Expr, bindings: &FormData) -> Result<FormulaValue, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(FormulaValue::Number(*n)),
        Expr::String(s) => Ok(FormulaValue::String(s.clone())),
        Expr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),
        Expr::Variable(name) => resolve_binding(name, bindings),
        Expr::Unary { op, operand } => match (op, evaluate(operand, bindings)?) {
            (UnaryOp::Negate, FormulaValue::Number(n)) => Ok(FormulaValue::Number(-n)),
            (UnaryOp::Plus, FormulaValue::Number(n)) => Ok(FormulaValue::Number(n)),
            (op, value) => Err(FormulaError::TypeMismatch {
                op: if *op == UnaryOp::Negate { "-" } else { "+" },
                left: value.type_name(),
                right: value.type_name(),
            }),
        },
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            apply_binary(*op, left, right)
        }
    }
}

fn apply_binary(
    op: BinaryOp,
    left: FormulaValue,
    right: FormulaValue,
) -> Result<FormulaValue, FormulaError> {
    use FormulaValue::*;

    match op {
        BinaryOp::Add => match (&left, &right) {
            (Number(a), Number(b)) => Ok(Number(a + b)),
            (String(_), _) | (_, String(_)) => {
                Ok(String(format!("{}{}", left.concat_text(), right.concat_text())))
            }
            _ => Err(mismatch(op, &left, &right)),
        },
        BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => match (&left, &right) {
            (Number(a), Number(b)) => match op {
                BinaryOp::Subtract => Ok(Number(a - b)),
                BinaryOp::Multiply => Ok(Number(a * b)),
                _ if *b == 0.0 => Err(FormulaError::DivisionByZero),
                _ => Ok(Number(a / b)),
            },
            _ => Err(mismatch(op, &left, &right)),
        },
        BinaryOp::Equal => Ok(Boolean(left == right)),
        BinaryOp::NotEqual => Ok(Boolean(left != right)),
        BinaryOp::GreaterThan
        | BinaryOp::GreaterEqual
        | BinaryOp::LessThan
        | BinaryOp::LessEqual => {
            let ordering = match (&left, &right) {
                (Number(a), Number(b)) => a.partial_cmp(b),
                (String(a), String(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, &left, &right)),
            };
            let Some(ordering) = ordering else {
                return Ok(Boolean(false));
            };
            Ok(Boolean(match op {
                BinaryOp::GreaterThan => ordering.is_gt(),
                BinaryOp::GreaterEqual => ordering.is_ge(),
                BinaryOp::LessThan => ordering.is_lt(),
                _ => ordering.is_le(),
            }))
        }
    }
}

fn mismatch(op: BinaryOp, left: &FormulaValue, right: &FormulaValue) -> FormulaError {
    FormulaError::TypeMismatch { op: op.symbol(), left: left.type_name(), right: right.type_name() }
}
