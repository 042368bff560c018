use super::data;
use form_rules::engine::ConditionalLogicEngine;
use form_rules::metadata::{FieldMetadata, FieldType};
use serde_json::{Value, json};

#[test]
fn test_product_of_two_fields() {
    let engine = ConditionalLogicEngine::default();
    let value = engine.calculate_formula_value("price * qty", &data(json!({"price": 10, "qty": 3})));
    assert_eq!(value, Some(json!(30)));
}

#[test]
fn test_numeric_strings_count_as_numbers() {
    let engine = ConditionalLogicEngine::default();
    let value = engine.calculate_formula_value("(price + 2.5) * qty", &data(json!({"price": "10", "qty": 2})));
    assert_eq!(value, Some(json!(25)));
}

#[test]
fn test_failures_yield_none() {
    let engine = ConditionalLogicEngine::default();
    let form = data(json!({"price": 10, "qty": 3, "name": null}));

    assert_eq!(engine.calculate_formula_value("price * missing", &form), None);
    assert_eq!(engine.calculate_formula_value("price * ", &form), None);
    assert_eq!(engine.calculate_formula_value("price / 0", &form), None);
    assert_eq!(engine.calculate_formula_value("name + 1", &form), None);
    assert_eq!(engine.calculate_formula_value("   ", &form), None);
}

#[test]
fn test_formulas_cannot_execute_code() {
    let engine = ConditionalLogicEngine::default();
    let form = data(json!({"price": 10}));

    assert_eq!(engine.calculate_formula_value("process.exit(1)", &form), None);
    assert_eq!(engine.calculate_formula_value("price; price = 0", &form), None);
    assert_eq!(engine.calculate_formula_value("[price]", &form), None);
}

#[test]
fn test_recalculate_chains_in_declaration_order() {
    let engine = ConditionalLogicEngine::default();
    let fields = vec![
        FieldMetadata::new("price", "Price", FieldType::Number),
        FieldMetadata::new("qty", "Quantity", FieldType::Number),
        FieldMetadata::new("subtotal", "Subtotal", FieldType::Calculated).with_formula("price * qty"),
        FieldMetadata::new("tax", "Tax", FieldType::Calculated).with_formula("subtotal * 0.5"),
        FieldMetadata::new("broken", "Broken", FieldType::Calculated).with_formula("subtotal +"),
    ];

    let calculated = engine.recalculate(&fields, &data(json!({"price": 10, "qty": 3})));

    assert_eq!(calculated.get("subtotal"), Some(&json!(30)));
    assert_eq!(calculated.get("tax"), Some(&json!(15)));
    assert_eq!(calculated.get("broken"), Some(&Value::Null));
    assert!(!calculated.contains_key("price"));
}

#[test]
fn test_keys_with_punctuation_are_single_fields() {
    let engine = ConditionalLogicEngine::default();

    let hyphenated = data(json!({"unit-price": 10, "qty": 3}));
    assert_eq!(engine.calculate_formula_value("unit-price * qty", &hyphenated), Some(json!(30)));

    let dotted = data(json!({"line.price": 10, "qty": 3}));
    assert_eq!(engine.calculate_formula_value("line.price * qty", &dotted), Some(json!(30)));

    let fields = vec![
        FieldMetadata::new("unit-price", "Unit price", FieldType::Number),
        FieldMetadata::new("qty", "Quantity", FieldType::Number),
        FieldMetadata::new("line-total", "Line total", FieldType::Calculated).with_formula("unit-price * qty"),
        FieldMetadata::new("with-tax", "With tax", FieldType::Calculated).with_formula("line-total * 1.5"),
    ];
    let calculated = engine.recalculate(&fields, &hyphenated);
    assert_eq!(calculated.get("with-tax"), Some(&json!(45)));
}
