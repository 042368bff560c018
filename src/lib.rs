pub mod cli;
pub mod coerce;
pub mod commands;
pub mod config;
pub mod engine;
pub mod formula;
pub mod metadata;

pub use config::{Config, EngineConfig, UnknownOperatorPolicy};
pub use engine::{ConditionalLogicEngine, FormRules, RuleError, ValidationEngine};
pub use metadata::{FieldMetadata, FieldState, FormData, ValidationResult};
