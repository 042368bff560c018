//! Static checks over form metadata
//!
//! The engines tolerate broken metadata at runtime (a bad formula evaluates to
//! nothing, an unknown operator follows the configured policy). These checks
//! surface such problems up front so they can be fixed in the form definition.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{ConditionAction, ConditionOperator, FieldMetadata, ValidationRuleType};
use crate::config::EngineConfig;
use crate::engine::FieldValidator;
use crate::formula::FormulaEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub severity: LintSeverity,
    pub field: String,
    pub message: String,
}

impl LintFinding {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self { severity: LintSeverity::Error, field: field.to_string(), message: message.into() }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self { severity: LintSeverity::Warning, field: field.to_string(), message: message.into() }
    }
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Error => "error",
        };
        write!(f, "{}: {}: {}", severity, self.field, self.message)
    }
}

/// Check a form's fields, returning findings in field order
pub fn lint_fields(fields: &[FieldMetadata], config: &EngineConfig) -> Vec<LintFinding> {
    let formulas = FormulaEvaluator::new(config);
    let validator = FieldValidator::new(config);
    let field_keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    let keys: HashSet<&str> = field_keys.iter().copied().collect();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut findings = Vec::new();

    for field in fields {
        let key = field.key.as_str();

        if key.trim().is_empty() {
            findings.push(LintFinding::error(key, format!("field '{}' has an empty key", field.label)));
        }

        let seen = occurrences.entry(key).or_insert(0);
        *seen += 1;
        if *seen == 2 {
            findings.push(LintFinding::error(key, "key is declared more than once"));
        }

        for condition in &field.conditions {
            if !keys.contains(condition.field.as_str()) {
                findings.push(LintFinding::warning(
                    key,
                    format!("condition references unknown field '{}'", condition.field),
                ));
            }
            if let ConditionOperator::Unknown(name) = &condition.operator {
                findings.push(LintFinding::error(
                    key,
                    format!(
                        "unknown condition operator '{}' (evaluates as {:?})",
                        name, config.unknown_operator
                    ),
                ));
            }
            if let ConditionAction::Unknown(name) = &condition.action {
                findings.push(LintFinding::warning(
                    key,
                    format!("unknown condition action '{}' only affects visibility", name),
                ));
            }
        }

        if let Some(formula) = field.formula_text() {
            match formulas.parse_with_keys(formula, &field_keys) {
                Ok(expr) => {
                    if expr.identifiers().contains(key) {
                        findings.push(LintFinding::error(key, "formula references its own field"));
                    }
                    for name in expr.identifiers() {
                        if !keys.contains(name.as_str()) {
                            findings.push(LintFinding::warning(
                                key,
                                format!("formula references unknown field '{}'", name),
                            ));
                        }
                    }
                }
                Err(e) => findings.push(LintFinding::error(key, format!("formula does not parse: {}", e))),
            }
        }

        for rule in &field.validations {
            match &rule.rule_type {
                ValidationRuleType::Pattern => {
                    if let Err(e) = validator.compile_pattern(field, rule) {
                        findings.push(LintFinding::error(key, e.to_string()));
                    }
                }
                ValidationRuleType::Min | ValidationRuleType::Max => {
                    if crate::coerce::to_number(rule.value.as_ref()).is_nan() {
                        findings.push(LintFinding::warning(
                            key,
                            format!("'{}' rule has no numeric bound and never fails", rule.rule_type.as_str()),
                        ));
                    }
                }
                ValidationRuleType::Other(name) => {
                    findings.push(LintFinding::warning(key, format!("unsupported validation rule '{}'", name)));
                }
                ValidationRuleType::Required | ValidationRuleType::Email => {}
            }
        }
    }

    findings
}

/// Whether any finding should block using the metadata
pub fn has_errors(findings: &[LintFinding]) -> bool {
    findings.iter().any(|f| f.severity == LintSeverity::Error)
}
