use super::{condition, data, field, sales_form};
use form_rules::config::{EngineConfig, UnknownOperatorPolicy};
use form_rules::engine::ConditionalLogicEngine;
use form_rules::metadata::{ConditionAction, ConditionOperator, FieldMetadata, FieldType};
use serde_json::json;

#[test]
fn test_visibility_requires_every_condition() {
    let engine = ConditionalLogicEngine::default();
    let notes = FieldMetadata::new("notes", "Notes", FieldType::Textarea)
        .with_condition(condition("a", ConditionOperator::Equals, json!(1), ConditionAction::Show))
        .with_condition(condition("b", ConditionOperator::Equals, json!(2), ConditionAction::Disable));

    assert!(engine.should_show_field(&notes, &data(json!({"a": 1, "b": 2}))));
    assert!(!engine.should_show_field(&notes, &data(json!({"a": 1, "b": 3}))));
    assert!(!engine.should_show_field(&notes, &data(json!({"b": 2}))));
}

#[test]
fn test_any_disable_condition_disables() {
    let engine = ConditionalLogicEngine::default();
    let amount = FieldMetadata::new("amount", "Amount", FieldType::Number)
        .with_condition(condition("locked", ConditionOperator::Equals, json!(true), ConditionAction::Disable))
        .with_condition(condition("status", ConditionOperator::Equals, json!("closed"), ConditionAction::Disable));

    assert!(engine.should_disable_field(&amount, &data(json!({"locked": false, "status": "closed"}))));
    assert!(engine.should_disable_field(&amount, &data(json!({"locked": true, "status": "open"}))));
    assert!(!engine.should_disable_field(&amount, &data(json!({"locked": false, "status": "open"}))));
}

#[test]
fn test_field_state_is_stable_across_calls() {
    let engine = ConditionalLogicEngine::default();
    let fields = sales_form();
    let form = data(json!({"tier": "gold", "price": 10, "qty": 3}));

    let first = engine.get_field_state(field(&fields, "discount"), &form);
    let second = engine.get_field_state(field(&fields, "discount"), &form);
    assert_eq!(first, second);
}

#[test]
fn test_gold_tier_requires_discount() {
    let engine = ConditionalLogicEngine::default();
    let fields = sales_form();
    let discount = field(&fields, "discount");

    let gold = engine.get_field_state(discount, &data(json!({"tier": "gold"})));
    assert!(gold.visible);
    assert!(gold.required);
    assert!(!gold.disabled);

    let silver = engine.get_field_state(discount, &data(json!({"tier": "silver"})));
    assert!(!silver.required);
    assert!(!silver.visible);
}

#[test]
fn test_visible_fields_follow_calculated_total() {
    let engine = ConditionalLogicEngine::default();
    let fields = sales_form();

    let small = data(json!({"price": 10, "qty": 3, "total": 30}));
    let keys: Vec<&str> = engine
        .get_visible_fields(&fields, &small)
        .iter()
        .map(|f| f.key.as_str())
        .collect();
    assert!(!keys.contains(&"notes"));

    let large = data(json!({"price": 500, "qty": 3, "total": 1500}));
    let keys: Vec<&str> = engine
        .get_visible_fields(&fields, &large)
        .iter()
        .map(|f| f.key.as_str())
        .collect();
    assert!(keys.contains(&"notes"));
    assert_eq!(keys.first(), Some(&"price"));
}

#[test]
fn test_unknown_operator_policy() {
    let field = FieldMetadata::new("x", "X", FieldType::Text).with_condition(condition(
        "y",
        ConditionOperator::Unknown("startsWith".to_string()),
        json!("a"),
        ConditionAction::Show,
    ));
    let form = data(json!({"y": "abc"}));

    assert!(ConditionalLogicEngine::default().should_show_field(&field, &form));

    let strict = EngineConfig::builder()
        .unknown_operator(UnknownOperatorPolicy::FailClosed)
        .build();
    assert!(!ConditionalLogicEngine::new(&strict).should_show_field(&field, &form));
}

#[test]
fn test_dynamic_options_are_static_options() {
    let engine = ConditionalLogicEngine::default();
    let fields = sales_form();

    let options = engine.get_dynamic_options(field(&fields, "tier"), &data(json!({})));
    assert_eq!(options.len(), 2);
    assert_eq!(options[1].value, json!("gold"));
    assert!(engine.get_dynamic_options(field(&fields, "price"), &data(json!({}))).is_empty());
}
