use super::{data, field, sales_form};
use form_rules::engine::{
    RuleError, SchemaError, SchemaIssue, SchemaValidator, ValidationEngine, ROOT_ERROR_KEY,
};
use form_rules::config::EngineConfig;
use form_rules::metadata::{FieldMetadata, FieldType, FormData, ValidationRule};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_required_zero_is_invalid() {
    let engine = ValidationEngine::default();
    let fields = sales_form();

    let result = engine.validate_field(field(&fields, "qty"), Some(&json!(0))).unwrap();
    assert!(!result.valid);
    assert_eq!(result.error.as_deref(), Some("Quantity is required"));
}

#[test]
fn test_first_failing_rule_wins() {
    let engine = ValidationEngine::default();
    let score = FieldMetadata::new("score", "Score", FieldType::Number)
        .with_validation(ValidationRule::min(10))
        .with_validation(ValidationRule::max(3));

    let result = engine.validate_field(&score, Some(&json!(5))).unwrap();
    assert_eq!(result.error.as_deref(), Some("Score must be at least 10"));
}

#[test]
fn test_email_field_messages() {
    let engine = ValidationEngine::default();
    let fields = sales_form();
    let contact = field(&fields, "contact");

    assert!(engine.validate_field(contact, Some(&json!("a@b.co"))).unwrap().valid);

    let result = engine.validate_field(contact, Some(&json!("not-an-email"))).unwrap();
    assert_eq!(result.error.as_deref(), Some("Please enter a work email"));

    let plain = FieldMetadata::new("email", "Email", FieldType::Email);
    let result = engine.validate_field(&plain, Some(&json!("not-an-email"))).unwrap();
    assert_eq!(result.error.as_deref(), Some("Email must be a valid email"));
}

#[test]
fn test_invalid_pattern_is_a_rule_error() {
    let engine = ValidationEngine::default();
    let code = FieldMetadata::new("code", "Code", FieldType::Text)
        .with_validation(ValidationRule::pattern("[a-z"));

    let err = engine.validate_field(&code, Some(&json!("abc"))).unwrap_err();
    assert!(matches!(err, RuleError::InvalidPattern { ref field, .. } if field == "code"));
}

#[test]
fn test_pattern_rule_with_custom_message() {
    let engine = ValidationEngine::default();
    let code = FieldMetadata::new("code", "Code", FieldType::Text)
        .with_validation(ValidationRule::pattern("^[A-Z]{3}-\\d+$").with_message("Use the ABC-123 format"));

    assert!(engine.validate_field(&code, Some(&json!("ABC-42"))).unwrap().valid);
    let result = engine.validate_field(&code, Some(&json!("abc"))).unwrap();
    assert_eq!(result.error.as_deref(), Some("Use the ABC-123 format"));
}

#[test]
fn test_record_validation_collects_field_errors() {
    let engine = ValidationEngine::default();
    let fields = sales_form();

    let result = engine.validate_form_data(&fields, &data(json!({"price": 10, "contact": "nope"})));

    assert!(!result.valid);
    assert_eq!(result.error_for("qty"), Some("Quantity is required"));
    assert_eq!(result.error_for("contact"), Some("Please enter a work email"));
    assert_eq!(result.error_for("price"), None);
}

struct FixedIssues(Vec<SchemaIssue>);

impl SchemaValidator for FixedIssues {
    fn validate(&self, _fields: &[FieldMetadata], _form_data: &FormData) -> Result<(), SchemaError> {
        Err(SchemaError::Invalid(self.0.clone()))
    }
}

#[test]
fn test_schema_issues_are_normalized() {
    let schema = FixedIssues(vec![
        SchemaIssue::record("Totals do not add up"),
        SchemaIssue::at("qty", "first"),
        SchemaIssue { path: vec!["qty".to_string(), "0".to_string()], message: "second".to_string() },
    ]);
    let engine = ValidationEngine::with_schema(&EngineConfig::default(), Arc::new(schema));

    let result = engine.validate_form_data(&[], &FormData::new());

    assert!(!result.valid);
    assert_eq!(result.error_for(ROOT_ERROR_KEY), Some("Totals do not add up"));
    assert_eq!(result.error_for("qty"), Some("second"));
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_empty_issue_list_still_fails() {
    let engine = ValidationEngine::with_schema(&EngineConfig::default(), Arc::new(FixedIssues(Vec::new())));

    let result = engine.validate_form_data(&[], &FormData::new());
    assert!(!result.valid);
    assert_eq!(result.error_for(ROOT_ERROR_KEY), Some("Validation failed"));
}

#[test]
fn test_broken_rule_reported_at_root_alongside_field_errors() {
    let engine = ValidationEngine::default();
    let fields = vec![
        FieldMetadata::new("name", "Name", FieldType::Text).required(true),
        FieldMetadata::new("code", "Code", FieldType::Text).with_validation(ValidationRule::pattern("(")),
    ];

    let result = engine.validate_form_data(&fields, &data(json!({"code": "x"})));
    assert!(!result.valid);
    assert!(result.error_for(ROOT_ERROR_KEY).unwrap().contains("invalid pattern"));
    assert_eq!(result.error_for("name"), Some("Name is required"));
}
