//! Conditional field logic
//!
//! Visibility is the AND of every condition on a field, whatever its action:
//! each condition is a prerequisite for the field to appear. Disabling and
//! dynamic requiredness are the OR of the conditions tagged with that action,
//! so any single satisfied rule imposes the stricter state. Conditions never
//! make a statically required field optional.

use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

use super::condition::ConditionEvaluator;
use crate::config::EngineConfig;
use crate::formula::FormulaEvaluator;
use crate::metadata::{ConditionAction, FieldMetadata, FieldOption, FieldState, FormData};

#[derive(Debug, Clone, Default)]
pub struct ConditionalLogicEngine {
    conditions: ConditionEvaluator,
    formulas: FormulaEvaluator,
}

impl ConditionalLogicEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            conditions: ConditionEvaluator::new(config.unknown_operator),
            formulas: FormulaEvaluator::new(config),
        }
    }

    pub fn condition_evaluator(&self) -> &ConditionEvaluator {
        &self.conditions
    }

    pub fn formula_evaluator(&self) -> &FormulaEvaluator {
        &self.formulas
    }

    pub fn should_show_field(&self, field: &FieldMetadata, form_data: &FormData) -> bool {
        field
            .conditions
            .iter()
            .all(|condition| self.conditions.evaluate(condition, form_data))
    }

    pub fn should_disable_field(&self, field: &FieldMetadata, form_data: &FormData) -> bool {
        self.any_tagged(field, form_data, &ConditionAction::Disable)
    }

    pub fn get_field_state(&self, field: &FieldMetadata, form_data: &FormData) -> FieldState {
        FieldState {
            visible: self.should_show_field(field, form_data),
            disabled: self.should_disable_field(field, form_data),
            required: field.required || self.any_tagged(field, form_data, &ConditionAction::Require),
        }
    }

    /// Fields currently visible, in declaration order
    pub fn get_visible_fields<'a>(
        &self,
        fields: &'a [FieldMetadata],
        form_data: &FormData,
    ) -> Vec<&'a FieldMetadata> {
        fields
            .iter()
            .filter(|field| self.should_show_field(field, form_data))
            .collect()
    }

    /// Evaluate a calculated-field formula; `None` for a blank formula or any
    /// evaluation failure
    pub fn calculate_formula_value(&self, formula: &str, form_data: &FormData) -> Option<Value> {
        if formula.trim().is_empty() {
            return None;
        }
        self.formulas.evaluate(formula, form_data)
    }

    /// Choices for a select-like field. Only static options are supported.
    pub fn get_dynamic_options(&self, field: &FieldMetadata, _form_data: &FormData) -> Vec<FieldOption> {
        field.options.clone().unwrap_or_default()
    }

    /// Recompute every field that carries a formula, in declaration order
    ///
    /// Each result is written into a working copy of the form data before the
    /// next formula runs, so a formula may build on calculated fields declared
    /// above it. Failed formulas produce `null`.
    pub fn recalculate(&self, fields: &[FieldMetadata], form_data: &FormData) -> BTreeMap<String, Value> {
        let mut working = form_data.clone();
        let mut calculated = BTreeMap::new();

        for field in fields {
            let Some(formula) = field.formula_text() else {
                continue;
            };

            let value = self.calculate_formula_value(formula, &working).unwrap_or(Value::Null);
            debug!("Calculated field '{}' = {}", field.key, value);

            working.insert(field.key.clone(), value.clone());
            calculated.insert(field.key.clone(), value);
        }

        calculated
    }

    fn any_tagged(&self, field: &FieldMetadata, form_data: &FormData, action: &ConditionAction) -> bool {
        field
            .conditions
            .iter()
            .filter(|condition| &condition.action == action)
            .any(|condition| self.conditions.evaluate(condition, form_data))
    }
}
