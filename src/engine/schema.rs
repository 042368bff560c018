//! Record-level validation collaborator
//!
//! The validation engine does not own how a record schema is derived from
//! metadata. It hands the metadata and the record to a [`SchemaValidator`]
//! and normalizes whatever issues come back. [`RuleSchema`] is the built-in
//! implementation, deriving the schema from each field's own rules.

use log::error;
use thiserror::Error;

use super::validation::FieldValidator;
use crate::config::EngineConfig;
use crate::metadata::{FieldMetadata, FormData};

/// One structural problem with a record, located by field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl SchemaIssue {
    pub fn at(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: vec![field.into()], message: message.into() }
    }

    /// An issue about the record as a whole
    pub fn record(message: impl Into<String>) -> Self {
        Self { path: Vec::new(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("record failed validation with {} issue(s)", .0.len())]
    Invalid(Vec<SchemaIssue>),

    /// The validator itself could not run
    #[error("schema validation failed: {0}")]
    Internal(String),
}

pub trait SchemaValidator: Send + Sync {
    fn validate(&self, fields: &[FieldMetadata], form_data: &FormData) -> Result<(), SchemaError>;
}

/// Schema derived from each field's requiredness, type and declared rules
///
/// Rules that cannot be applied are reported as record-level issues next to
/// the field issues.
#[derive(Debug, Clone, Default)]
pub struct RuleSchema {
    fields: FieldValidator,
}

impl RuleSchema {
    pub fn new(config: &EngineConfig) -> Self {
        Self { fields: FieldValidator::new(config) }
    }
}

impl SchemaValidator for RuleSchema {
    fn validate(&self, fields: &[FieldMetadata], form_data: &FormData) -> Result<(), SchemaError> {
        let mut issues = Vec::new();

        for field in fields {
            match self.fields.validate_field(field, form_data.get(&field.key)) {
                Ok(outcome) => {
                    if let Some(message) = outcome.error {
                        issues.push(SchemaIssue::at(field.key.clone(), message));
                    }
                }
                // A broken rule is a record-level problem; keep checking the other fields
                Err(e) => {
                    error!("Validation rule could not be applied: {}", e);
                    issues.push(SchemaIssue::record(e.to_string()));
                }
            }
        }

        if issues.is_empty() { Ok(()) } else { Err(SchemaError::Invalid(issues)) }
    }
}
