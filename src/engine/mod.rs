//! Rule engines and the composition root that wires them together
//!
//! Both engines are stateless: every call is a pure function of the metadata
//! and form data passed in. A host builds one [`FormRules`] at startup and
//! shares it (it is `Send + Sync`) across all of its form sessions.

pub mod condition;
pub mod logic;
pub mod schema;
pub mod validation;

use log::{debug, error};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use condition::ConditionEvaluator;
pub use logic::ConditionalLogicEngine;
pub use schema::{RuleSchema, SchemaError, SchemaIssue, SchemaValidator};
pub use validation::{FieldValidator, ROOT_ERROR_KEY, RuleError, ValidationEngine};

use crate::config::EngineConfig;
use crate::metadata::{FieldMetadata, FormData, FormEvaluation, ValidationResult};

#[derive(Debug, Clone, Default)]
pub struct FormRules {
    logic: ConditionalLogicEngine,
    validation: ValidationEngine,
}

impl FormRules {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            logic: ConditionalLogicEngine::new(config),
            validation: ValidationEngine::new(config),
        }
    }

    /// Use a custom record-level schema validator
    pub fn with_schema(config: &EngineConfig, schema: Arc<dyn SchemaValidator>) -> Self {
        Self {
            logic: ConditionalLogicEngine::new(config),
            validation: ValidationEngine::with_schema(config, schema),
        }
    }

    pub fn logic(&self) -> &ConditionalLogicEngine {
        &self.logic
    }

    pub fn validation(&self) -> &ValidationEngine {
        &self.validation
    }

    /// Form data with freshly calculated values written over it
    pub fn with_calculated(&self, fields: &[FieldMetadata], form_data: &FormData) -> (FormData, BTreeMap<String, serde_json::Value>) {
        let calculated = self.logic.recalculate(fields, form_data);
        let mut merged = form_data.clone();
        for (key, value) in &calculated {
            merged.insert(key.clone(), value.clone());
        }
        (merged, calculated)
    }

    /// Everything a form needs to re-render after a data change
    pub fn evaluate(&self, fields: &[FieldMetadata], form_data: &FormData) -> FormEvaluation {
        let (merged, calculated) = self.with_calculated(fields, form_data);

        let states = fields
            .iter()
            .map(|field| (field.key.clone(), self.logic.get_field_state(field, &merged)))
            .collect();

        let visible = self
            .logic
            .get_visible_fields(fields, &merged)
            .into_iter()
            .map(|field| field.key.clone())
            .collect();

        FormEvaluation { states, visible, calculated }
    }

    /// Validate a submission the way the user saw the form
    ///
    /// Hidden fields are skipped and conditionally required fields are
    /// validated as required. Broken rules are reported under `"root"`.
    pub fn validate_submission(&self, fields: &[FieldMetadata], form_data: &FormData) -> ValidationResult {
        let (merged, _) = self.with_calculated(fields, form_data);
        let validator = self.validation.field_validator();
        let mut errors = BTreeMap::new();

        for field in fields {
            let state = self.logic.get_field_state(field, &merged);
            if !state.visible {
                debug!("Skipping hidden field '{}'", field.key);
                continue;
            }

            match validator.validate_field_as(field, merged.get(&field.key), state.required) {
                Ok(outcome) => {
                    if let Some(message) = outcome.error {
                        errors.insert(field.key.clone(), message);
                    }
                }
                Err(e) => {
                    error!("Validation rule could not be applied: {}", e);
                    errors.insert(ROOT_ERROR_KEY.to_string(), e.to_string());
                }
            }
        }

        ValidationResult::from_errors(errors)
    }
}
