use super::{data, sales_form};
use form_rules::engine::FormRules;
use form_rules::metadata::ValidationRule;
use serde_json::json;

#[test]
fn test_evaluate_reports_states_and_calculations() {
    let rules = FormRules::default();
    let fields = sales_form();

    let evaluation = rules.evaluate(&fields, &data(json!({"price": 500, "qty": 3, "tier": "gold"})));

    assert_eq!(evaluation.calculated.get("total"), Some(&json!(1500)));
    assert!(evaluation.visible.contains(&"notes".to_string()));
    assert!(evaluation.visible.contains(&"discount".to_string()));
    assert!(evaluation.states["discount"].required);
    assert_eq!(evaluation.states.len(), fields.len());
}

#[test]
fn test_submission_applies_dynamic_requiredness() {
    let rules = FormRules::default();
    let fields = sales_form();

    let gold = rules.validate_submission(&fields, &data(json!({"price": 10, "qty": 3, "tier": "gold"})));
    assert!(!gold.valid);
    assert_eq!(gold.error_for("discount"), Some("Discount is required"));

    let silver = rules.validate_submission(&fields, &data(json!({"price": 10, "qty": 3, "tier": "silver"})));
    assert!(silver.valid, "unexpected errors: {:?}", silver.errors);
}

#[test]
fn test_submission_skips_hidden_fields() {
    let rules = FormRules::default();
    let mut fields = sales_form();
    if let Some(notes) = fields.iter_mut().find(|f| f.key == "notes") {
        notes.required = true;
    }

    // total = 30 keeps notes hidden, so its requiredness does not apply
    let small = rules.validate_submission(&fields, &data(json!({"price": 10, "qty": 3})));
    assert!(small.valid, "unexpected errors: {:?}", small.errors);

    let large = rules.validate_submission(&fields, &data(json!({"price": 500, "qty": 3})));
    assert_eq!(large.error_for("notes"), Some("Notes is required"));
}

#[test]
fn test_required_message_is_templated() {
    let rules = FormRules::default();
    let mut fields = sales_form();
    if let Some(discount) = fields.iter_mut().find(|f| f.key == "discount") {
        discount.validations.push(ValidationRule::required().with_message("Enter the agreed discount"));
    }

    let result = rules.validate_submission(&fields, &data(json!({"price": 10, "qty": 3, "tier": "gold"})));
    assert_eq!(result.error_for("discount"), Some("Discount is required"));
}
