//! Calculated-field formulas
//!
//! A formula is a small arithmetic/string expression over other field keys,
//! e.g. `price * qty - discount`. Formula text comes from form metadata and is
//! treated as untrusted: it is tokenized and parsed into a tree that can only
//! express literals, field references, `+ - * /`, parentheses and
//! comparisons, then evaluated against the current form data. Nothing else
//! is reachable from a formula.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::metadata::FormData;

pub use ast::Expr;
pub use eval::FormulaValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is {length} characters long, the limit is {max_length}")]
    TooLong { length: usize, max_length: usize },

    #[error("unexpected character '{ch}' at position {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("unterminated string literal at position {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number '{text}' at position {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected token {token} at position {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("formula nests deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },

    #[error("'{0}' has no usable value")]
    Unresolvable(String),

    #[error("operator '{op}' cannot combine {left} and {right}")]
    TypeMismatch { op: &'static str, left: &'static str, right: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("formula produced a non-finite number")]
    NonFinite,
}

/// Parses and evaluates formulas within the configured size limits
#[derive(Debug, Clone)]
pub struct FormulaEvaluator {
    max_length: usize,
    max_depth: usize,
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FormulaEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self { max_length: config.max_formula_length, max_depth: config.max_formula_depth }
    }

    /// Parse formula text into an expression tree
    pub fn parse(&self, formula: &str) -> Result<Expr, FormulaError> {
        self.parse_with_keys(formula, &[])
    }

    /// Parse formula text, treating each of `keys` as a single field reference
    /// even when it is not a plain identifier
    pub fn parse_with_keys(&self, formula: &str, keys: &[&str]) -> Result<Expr, FormulaError> {
        let length = formula.chars().count();
        if length > self.max_length {
            return Err(FormulaError::TooLong { length, max_length: self.max_length });
        }

        let tokens = lexer::tokenize_with_keys(formula, keys)?;
        parser::parse(tokens, self.max_depth)
    }

    /// Evaluate a formula, reporting why it failed
    pub fn try_evaluate(&self, formula: &str, bindings: &FormData) -> Result<Value, FormulaError> {
        let keys: Vec<&str> = bindings.keys().map(String::as_str).collect();
        let expr = self.parse_with_keys(formula, &keys)?;
        eval::evaluate(&expr, bindings)?.into_json()
    }

    /// Evaluate a formula; any failure yields `None`
    pub fn evaluate(&self, formula: &str, bindings: &FormData) -> Option<Value> {
        match self.try_evaluate(formula, bindings) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Formula '{}' did not evaluate: {}", formula, e);
                None
            }
        }
    }
}

/// Evaluate a formula with the default limits
///
/// # Examples
/// ```rust
/// use form_rules::formula::evaluate;
/// use serde_json::json;
///
/// let data = json!({"price": 10, "qty": 3}).as_object().cloned().unwrap();
/// assert_eq!(evaluate("price * qty", &data), Some(json!(30)));
/// assert_eq!(evaluate("price * missing", &data), None);
/// ```
pub fn evaluate(formula: &str, bindings: &FormData) -> Option<Value> {
    FormulaEvaluator::default().evaluate(formula, bindings)
}
