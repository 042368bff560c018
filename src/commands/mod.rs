pub mod calc;
pub mod check;
pub mod state;
pub mod validate;

pub use calc::calc_command;
pub use check::check_command;
pub use state::state_command;
pub use validate::validate_command;

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::config::Config;
use crate::engine::FormRules;
use crate::metadata::{FieldMetadata, FileMetadataProvider, FormData, MetadataProvider};

/// Everything a command needs, built once from the loaded config
pub struct CommandContext {
    pub config: Config,
    pub rules: FormRules,
    provider: FileMetadataProvider,
}

impl CommandContext {
    pub fn new(config: Config, metadata_dir: Option<PathBuf>) -> Self {
        let root = config.metadata_dir(metadata_dir);
        debug!("Using metadata directory: {:?}", root);
        Self {
            rules: FormRules::new(&config.engine),
            provider: FileMetadataProvider::new(root),
            config,
        }
    }

    pub async fn load_form(&self, form_id: &str) -> Result<Vec<FieldMetadata>> {
        self.provider
            .load_fields(form_id)
            .await
            .with_context(|| format!("Failed to load metadata for form '{}'", form_id))
    }
}

/// Parse `--data`: inline JSON when it looks like an object, otherwise a file path
pub async fn read_form_data(input: &str) -> Result<FormData> {
    let content = if input.trim_start().starts_with('{') {
        input.to_string()
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read form data file: {}", input))?
    };

    let value: serde_json::Value =
        serde_json::from_str(&content).context("Form data is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("Form data must be a JSON object, got: {}", other),
    }
}
