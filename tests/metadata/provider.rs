use super::{LEAD_JSON, LEAD_TOML, write_form};
use form_rules::metadata::{
    ConditionAction, ConditionOperator, FieldType, FileMetadataProvider, MetadataProvider,
    ValidationRuleType,
};

#[tokio::test]
async fn test_loads_wrapped_json_form() {
    let dir = tempfile::tempdir().unwrap();
    write_form(dir.path(), "lead.json", LEAD_JSON);

    let provider = FileMetadataProvider::new(dir.path());
    let fields = provider.load_fields("lead").await.unwrap();

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].key, "name");
    assert!(fields[0].required);
    assert_eq!(fields[0].validations[0].rule_type, ValidationRuleType::Pattern);
    assert_eq!(fields[0].validations[0].message.as_deref(), Some("Letters only"));
    assert_eq!(fields[2].field_type, FieldType::Email);
    assert_eq!(fields[2].conditions[0].operator, ConditionOperator::GreaterThan);
    assert_eq!(fields[2].conditions[0].action, ConditionAction::Require);
}

#[tokio::test]
async fn test_loads_bare_json_array() {
    let dir = tempfile::tempdir().unwrap();
    write_form(
        dir.path(),
        "contact.json",
        r#"[{ "key": "email", "label": "Email", "type": "email" }]"#,
    );

    let fields = FileMetadataProvider::new(dir.path()).load_fields("contact").await.unwrap();
    assert_eq!(fields.len(), 1);
    assert!(!fields[0].required);
    assert!(fields[0].conditions.is_empty());
}

#[tokio::test]
async fn test_loads_toml_form() {
    let dir = tempfile::tempdir().unwrap();
    write_form(dir.path(), "order.toml", LEAD_TOML);

    let fields = FileMetadataProvider::new(dir.path()).load_fields("order").await.unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2].field_type, FieldType::Calculated);
    assert_eq!(fields[2].formula_text(), Some("price * qty"));
}

#[tokio::test]
async fn test_json_preferred_over_toml() {
    let dir = tempfile::tempdir().unwrap();
    write_form(dir.path(), "lead.json", LEAD_JSON);
    write_form(dir.path(), "lead.toml", LEAD_TOML);

    let fields = FileMetadataProvider::new(dir.path()).load_fields("lead").await.unwrap();
    assert_eq!(fields[0].key, "name");
}

#[tokio::test]
async fn test_unknown_names_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    write_form(
        dir.path(),
        "odd.json",
        r#"[{
            "key": "x",
            "label": "X",
            "type": "checkbox",
            "conditions": [{ "field": "y", "operator": "startsWith", "value": "a", "action": "highlight" }],
            "validations": [{ "type": "minLength", "value": 3 }]
        }]"#,
    );

    let fields = FileMetadataProvider::new(dir.path()).load_fields("odd").await.unwrap();
    assert_eq!(fields[0].field_type, FieldType::Other("checkbox".to_string()));
    assert_eq!(fields[0].conditions[0].operator, ConditionOperator::Unknown("startsWith".to_string()));
    assert_eq!(fields[0].conditions[0].action, ConditionAction::Unknown("highlight".to_string()));
    assert_eq!(fields[0].validations[0].rule_type, ValidationRuleType::Other("minLength".to_string()));
}

#[tokio::test]
async fn test_missing_and_malformed_forms() {
    let dir = tempfile::tempdir().unwrap();
    write_form(dir.path(), "broken.json", "{ not json");
    write_form(
        dir.path(),
        "dupes.json",
        r#"[{ "key": "a", "label": "A", "type": "text" }, { "key": "a", "label": "B", "type": "text" }]"#,
    );
    let provider = FileMetadataProvider::new(dir.path());

    let missing = provider.load_fields("nothing").await.unwrap_err();
    assert!(missing.to_string().contains("No metadata for form 'nothing'"));

    let broken = provider.load_fields("broken").await.unwrap_err();
    assert!(broken.to_string().contains("Failed to parse metadata file"));

    let dupes = provider.load_fields("dupes").await.unwrap_err();
    assert!(dupes.to_string().contains("more than once"));
}
