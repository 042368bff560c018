use log::warn;
use serde_json::Value;

use crate::coerce::{strict_equals, to_js_string, to_number};
use crate::config::UnknownOperatorPolicy;
use crate::metadata::{ConditionOperator, FieldCondition, FormData};

/// Decides whether a single field condition holds for the current form data
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator {
    unknown_operator: UnknownOperatorPolicy,
}

impl ConditionEvaluator {
    pub fn new(unknown_operator: UnknownOperatorPolicy) -> Self {
        Self { unknown_operator }
    }

    pub fn unknown_operator_policy(&self) -> UnknownOperatorPolicy {
        self.unknown_operator
    }

    pub fn evaluate(&self, condition: &FieldCondition, form_data: &FormData) -> bool {
        let actual = form_data.get(&condition.field);
        let expected = &condition.value;

        match &condition.operator {
            ConditionOperator::Equals => strict_equals(actual, expected),
            ConditionOperator::NotEquals => !strict_equals(actual, expected),
            // NaN on either side makes both comparisons false
            ConditionOperator::GreaterThan => to_number(actual) > to_number(Some(expected)),
            ConditionOperator::LessThan => to_number(actual) < to_number(Some(expected)),
            ConditionOperator::Contains => {
                to_js_string(actual).contains(&to_js_string(Some(expected)))
            }
            ConditionOperator::In => match expected {
                Value::Array(candidates) => candidates
                    .iter()
                    .any(|candidate| strict_equals(actual, candidate)),
                _ => false,
            },
            ConditionOperator::Unknown(name) => {
                let outcome = self.unknown_operator == UnknownOperatorPolicy::FailOpen;
                warn!(
                    "Unknown condition operator '{}' on field '{}', treating condition as {}",
                    name,
                    condition.field,
                    if outcome { "satisfied" } else { "not satisfied" }
                );
                outcome
            }
        }
    }
}
