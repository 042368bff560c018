use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::schema::{RuleSchema, SchemaError, SchemaValidator};
use crate::coerce::{is_truthy, to_js_string, to_number};
use crate::config::EngineConfig;
use crate::metadata::{
    FieldMetadata, FieldType, FieldValidation, FormData, ValidationResult, ValidationRule,
    ValidationRuleType,
};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Key used for record-level errors that belong to no single field
pub const ROOT_ERROR_KEY: &str = "root";

/// A validation rule that cannot be applied as written
///
/// These are problems with the form configuration, not with the submitted
/// data, and are reported separately from field errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("field '{field}': invalid pattern '{pattern}': {reason}")]
    InvalidPattern { field: String, pattern: String, reason: String },

    #[error("field '{field}': pattern is {length} characters long, the limit is {max_length}")]
    PatternTooLong { field: String, length: usize, max_length: usize },

    #[error("field '{field}': '{rule}' rule has no usable value")]
    MissingRuleValue { field: String, rule: String },
}

/// Applies the per-field checks: requiredness, type checks, declared rules
#[derive(Debug, Clone)]
pub struct FieldValidator {
    max_pattern_length: usize,
    regex_size_limit: usize,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FieldValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_pattern_length: config.max_pattern_length,
            regex_size_limit: config.regex_size_limit,
        }
    }

    pub fn validate_field(
        &self,
        field: &FieldMetadata,
        value: Option<&Value>,
    ) -> Result<FieldValidation, RuleError> {
        self.validate_field_as(field, value, field.required)
    }

    /// Validate with an explicit requiredness, e.g. one raised by a condition
    ///
    /// Order: requiredness, then the type check for the field type, then each
    /// declared rule. The first failure wins. Empty optional values skip
    /// everything after the requiredness check. Zero counts as empty. The
    /// requiredness message is always the templated one; a declared
    /// `required` rule's message applies only when that rule itself fails.
    pub fn validate_field_as(
        &self,
        field: &FieldMetadata,
        value: Option<&Value>,
        required: bool,
    ) -> Result<FieldValidation, RuleError> {
        if !is_truthy(value) {
            if required {
                return Ok(FieldValidation::fail(format!("{} is required", field.label)));
            }
            return Ok(FieldValidation::ok());
        }

        if let Some(message) = self.check_type(field, value) {
            return Ok(FieldValidation::fail(message));
        }

        for rule in &field.validations {
            if let Some(message) = self.check_rule(field, rule, value)? {
                return Ok(FieldValidation::fail(message));
            }
        }

        Ok(FieldValidation::ok())
    }

    /// Compile a pattern rule the way validation would, without applying it
    pub fn compile_pattern(&self, field: &FieldMetadata, rule: &ValidationRule) -> Result<Regex, RuleError> {
        let pattern = match &rule.value {
            Some(Value::String(pattern)) => pattern.clone(),
            Some(number @ Value::Number(_)) => to_js_string(Some(number)),
            _ => {
                return Err(RuleError::MissingRuleValue {
                    field: field.key.clone(),
                    rule: rule.rule_type.as_str().to_string(),
                });
            }
        };

        let length = pattern.chars().count();
        if length > self.max_pattern_length {
            return Err(RuleError::PatternTooLong {
                field: field.key.clone(),
                length,
                max_length: self.max_pattern_length,
            });
        }

        RegexBuilder::new(&pattern)
            .size_limit(self.regex_size_limit)
            .build()
            .map_err(|e| RuleError::InvalidPattern {
                field: field.key.clone(),
                pattern,
                reason: e.to_string(),
            })
    }

    fn check_type(&self, field: &FieldMetadata, value: Option<&Value>) -> Option<String> {
        match field.field_type {
            FieldType::Email if !is_email(value) => Some(message_for(
                field,
                &ValidationRuleType::Email,
                format!("{} must be a valid email", field.label),
            )),
            FieldType::Number if to_number(value).is_nan() => {
                Some(format!("{} must be a number", field.label))
            }
            FieldType::Date if !value.map(is_parseable_date).unwrap_or(false) => {
                Some(format!("{} must be a valid date", field.label))
            }
            _ => None,
        }
    }

    fn check_rule(
        &self,
        field: &FieldMetadata,
        rule: &ValidationRule,
        value: Option<&Value>,
    ) -> Result<Option<String>, RuleError> {
        let label = &field.label;
        let failure = match &rule.rule_type {
            ValidationRuleType::Required => {
                (!is_truthy(value)).then(|| format!("{} is required", label))
            }
            ValidationRuleType::Email => {
                (!is_email(value)).then(|| format!("{} must be a valid email", label))
            }
            ValidationRuleType::Min => {
                let bound = to_number(rule.value.as_ref());
                (to_number(value) < bound).then(|| {
                    format!("{} must be at least {}", label, to_js_string(rule.value.as_ref()))
                })
            }
            ValidationRuleType::Max => {
                let bound = to_number(rule.value.as_ref());
                (to_number(value) > bound).then(|| {
                    format!("{} must be at most {}", label, to_js_string(rule.value.as_ref()))
                })
            }
            ValidationRuleType::Pattern => {
                let regex = self.compile_pattern(field, rule)?;
                (!regex.is_match(&to_js_string(value))).then(|| format!("{} format is invalid", label))
            }
            ValidationRuleType::Other(name) => {
                debug!("Skipping unsupported validation rule '{}' on field '{}'", name, field.key);
                None
            }
        };

        Ok(failure.map(|default| rule.message.clone().unwrap_or(default)))
    }
}

/// Custom message of the first declared rule of `rule_type`, or the default
fn message_for(field: &FieldMetadata, rule_type: &ValidationRuleType, default: String) -> String {
    field
        .validations
        .iter()
        .find(|rule| &rule.rule_type == rule_type)
        .and_then(|rule| rule.message.clone())
        .unwrap_or(default)
}

fn is_email(value: Option<&Value>) -> bool {
    EMAIL_PATTERN.is_match(&to_js_string(value))
}

fn is_parseable_date(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().map(f64::is_finite).unwrap_or(false),
        Value::String(s) => parse_date_str(s.trim()),
        _ => false,
    }
}

fn parse_date_str(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(text).is_ok() || DateTime::parse_from_rfc2822(text).is_ok() {
        return true;
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATE_TIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(text, format).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

/// Validates single fields and whole records
#[derive(Clone)]
pub struct ValidationEngine {
    fields: FieldValidator,
    schema: Arc<dyn SchemaValidator>,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ValidationEngine {
    /// Engine whose record validation uses the schema generated from field rules
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_schema(config, Arc::new(RuleSchema::new(config)))
    }

    pub fn with_schema(config: &EngineConfig, schema: Arc<dyn SchemaValidator>) -> Self {
        Self { fields: FieldValidator::new(config), schema }
    }

    pub fn field_validator(&self) -> &FieldValidator {
        &self.fields
    }

    pub fn validate_field(
        &self,
        field: &FieldMetadata,
        value: Option<&Value>,
    ) -> Result<FieldValidation, RuleError> {
        self.fields.validate_field(field, value)
    }

    /// Validate a whole record through the schema collaborator
    ///
    /// Issues are keyed by the first segment of their path, or `"root"` when
    /// they carry none. When several issues land on one key the last one wins.
    pub fn validate_form_data(&self, metadata: &[FieldMetadata], form_data: &FormData) -> ValidationResult {
        let mut errors = BTreeMap::new();

        match self.schema.validate(metadata, form_data) {
            Ok(()) => {}
            Err(SchemaError::Invalid(issues)) => {
                if issues.is_empty() {
                    errors.insert(ROOT_ERROR_KEY.to_string(), "Validation failed".to_string());
                }
                for issue in issues {
                    let key = issue
                        .path
                        .first()
                        .cloned()
                        .unwrap_or_else(|| ROOT_ERROR_KEY.to_string());
                    errors.insert(key, issue.message);
                }
            }
            Err(SchemaError::Internal(reason)) => {
                error!("Record validation failed internally: {}", reason);
                errors.insert(ROOT_ERROR_KEY.to_string(), reason);
            }
        }

        debug!("Record validation produced {} error(s)", errors.len());
        ValidationResult::from_errors(errors)
    }
}
