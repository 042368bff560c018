//! Declarative form metadata
//!
//! These types describe a business form the way the metadata provider hands
//! it over: fields with their type, conditions, validation rules and
//! (for calculated fields) a formula. Operator, action, rule and field type
//! names are open sets; names the engine does not know are kept verbatim so
//! evaluation and linting can report them instead of failing to load.

pub mod lint;
pub mod provider;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use lint::{LintFinding, LintSeverity, has_errors, lint_fields};
pub use provider::{FileMetadataProvider, InMemoryMetadataProvider, MetadataProvider};

/// Current state of one form instance, keyed by field key
pub type FormData = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<FieldCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,
}

impl FieldMetadata {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            options: None,
            formula: None,
            conditions: Vec::new(),
            validations: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_condition(mut self, condition: FieldCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    /// Formula text, if the field carries a non-blank one
    pub fn formula_text(&self) -> Option<&str> {
        self.formula.as_deref().filter(|f| !f.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Date,
    Select,
    Textarea,
    Calculated,
    Other(String),
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "date" => FieldType::Date,
            "select" => FieldType::Select,
            "textarea" => FieldType::Textarea,
            "calculated" => FieldType::Calculated,
            _ => FieldType::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
            FieldType::Calculated => "calculated",
            FieldType::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// A comparison against another field's current value, plus the effect
/// it has when it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
    pub action: ConditionAction,
}

impl FieldCondition {
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<Value>,
        action: ConditionAction,
    ) -> Self {
        Self { field: field.into(), operator, value: value.into(), action }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    In,
    Unknown(String),
}

impl From<String> for ConditionOperator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => ConditionOperator::Equals,
            "notEquals" => ConditionOperator::NotEquals,
            "greaterThan" => ConditionOperator::GreaterThan,
            "lessThan" => ConditionOperator::LessThan,
            "contains" => ConditionOperator::Contains,
            "in" => ConditionOperator::In,
            _ => ConditionOperator::Unknown(name),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(operator: ConditionOperator) -> Self {
        operator.as_str().to_string()
    }
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::Contains => "contains",
            ConditionOperator::In => "in",
            ConditionOperator::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionAction {
    Show,
    Disable,
    Require,
    Unknown(String),
}

impl From<String> for ConditionAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "show" => ConditionAction::Show,
            "disable" => ConditionAction::Disable,
            "require" => ConditionAction::Require,
            _ => ConditionAction::Unknown(name),
        }
    }
}

impl From<ConditionAction> for String {
    fn from(action: ConditionAction) -> Self {
        action.as_str().to_string()
    }
}

impl ConditionAction {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionAction::Show => "show",
            ConditionAction::Disable => "disable",
            ConditionAction::Require => "require",
            ConditionAction::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub rule_type: ValidationRuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(rule_type: ValidationRuleType) -> Self {
        Self { rule_type, value: None, message: None }
    }

    pub fn required() -> Self {
        Self::new(ValidationRuleType::Required)
    }

    pub fn email() -> Self {
        Self::new(ValidationRuleType::Email)
    }

    pub fn min(value: impl Into<Value>) -> Self {
        Self::new(ValidationRuleType::Min).with_value(value)
    }

    pub fn max(value: impl Into<Value>) -> Self {
        Self::new(ValidationRuleType::Max).with_value(value)
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::new(ValidationRuleType::Pattern).with_value(Value::String(pattern.into()))
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationRuleType {
    Required,
    Email,
    Min,
    Max,
    Pattern,
    Other(String),
}

impl From<String> for ValidationRuleType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "required" => ValidationRuleType::Required,
            "email" => ValidationRuleType::Email,
            "min" => ValidationRuleType::Min,
            "max" => ValidationRuleType::Max,
            "pattern" => ValidationRuleType::Pattern,
            _ => ValidationRuleType::Other(name),
        }
    }
}

impl From<ValidationRuleType> for String {
    fn from(rule_type: ValidationRuleType) -> Self {
        rule_type.as_str().to_string()
    }
}

impl ValidationRuleType {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationRuleType::Required => "required",
            ValidationRuleType::Email => "email",
            ValidationRuleType::Min => "min",
            ValidationRuleType::Max => "max",
            ValidationRuleType::Pattern => "pattern",
            ValidationRuleType::Other(name) => name,
        }
    }
}

/// Presentation state of one field for the current form data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub visible: bool,
    pub disabled: bool,
    pub required: bool,
}

/// Outcome of validating a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldValidation {
    pub fn ok() -> Self {
        Self { valid: true, error: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { valid: false, error: Some(message.into()) }
    }
}

/// Outcome of validating a whole record: one message per invalid field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }
}

/// Everything a hosting form needs to render after a data change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormEvaluation {
    pub states: BTreeMap<String, FieldState>,
    pub visible: Vec<String>,
    pub calculated: BTreeMap<String, Value>,
}
