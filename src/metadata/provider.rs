//! Sources of form metadata
//!
//! The engines never fetch metadata themselves; a host asks a
//! [`MetadataProvider`] for the fields of a form id once per form session.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::FieldMetadata;

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn load_fields(&self, form_id: &str) -> Result<Vec<FieldMetadata>>;
}

/// Metadata held in memory, e.g. registered by tests or embedded at build time
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataProvider {
    forms: HashMap<String, Vec<FieldMetadata>>,
}

impl InMemoryMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self, form_id: impl Into<String>, fields: Vec<FieldMetadata>) -> Self {
        self.insert(form_id, fields);
        self
    }

    pub fn insert(&mut self, form_id: impl Into<String>, fields: Vec<FieldMetadata>) {
        self.forms.insert(form_id.into(), fields);
    }
}

#[async_trait]
impl MetadataProvider for InMemoryMetadataProvider {
    async fn load_fields(&self, form_id: &str) -> Result<Vec<FieldMetadata>> {
        let fields = self
            .forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Form '{}' not found", form_id))?;
        ensure_unique_keys(form_id, &fields)?;
        Ok(fields)
    }
}

/// Reads `<form_id>.json` or `<form_id>.toml` from a directory
///
/// JSON files hold either a bare array of fields or an object with a
/// `fields` array; TOML files hold `[[fields]]` tables. JSON wins when both
/// exist.
#[derive(Debug, Clone)]
pub struct FileMetadataProvider {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonForm {
    Fields(Vec<FieldMetadata>),
    Wrapped { fields: Vec<FieldMetadata> },
}

#[derive(Debug, Deserialize)]
struct TomlForm {
    #[serde(default)]
    fields: Vec<FieldMetadata>,
}

impl FileMetadataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn form_path(&self, form_id: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", form_id, extension))
    }
}

#[async_trait]
impl MetadataProvider for FileMetadataProvider {
    async fn load_fields(&self, form_id: &str) -> Result<Vec<FieldMetadata>> {
        if form_id.is_empty()
            || !form_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(anyhow::anyhow!("Invalid form id: '{}'", form_id));
        }

        let json_path = self.form_path(form_id, "json");
        let toml_path = self.form_path(form_id, "toml");

        let fields = if tokio::fs::try_exists(&json_path).await.unwrap_or(false) {
            debug!("Loading form metadata from: {:?}", json_path);
            let content = tokio::fs::read_to_string(&json_path)
                .await
                .with_context(|| format!("Failed to read metadata file: {:?}", json_path))?;
            let form: JsonForm = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse metadata file: {:?}", json_path))?;
            match form {
                JsonForm::Fields(fields) | JsonForm::Wrapped { fields } => fields,
            }
        } else if tokio::fs::try_exists(&toml_path).await.unwrap_or(false) {
            debug!("Loading form metadata from: {:?}", toml_path);
            let content = tokio::fs::read_to_string(&toml_path)
                .await
                .with_context(|| format!("Failed to read metadata file: {:?}", toml_path))?;
            let form: TomlForm = toml::from_str(&content)
                .with_context(|| format!("Failed to parse metadata file: {:?}", toml_path))?;
            form.fields
        } else {
            return Err(anyhow::anyhow!(
                "No metadata for form '{}' in {}",
                form_id,
                self.root.display()
            ));
        };

        ensure_unique_keys(form_id, &fields)?;
        info!("Loaded {} fields for form '{}'", fields.len(), form_id);
        Ok(fields)
    }
}

fn ensure_unique_keys(form_id: &str, fields: &[FieldMetadata]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.key.as_str()) {
            return Err(anyhow::anyhow!(
                "Form '{}' declares field '{}' more than once",
                form_id,
                field.key
            ));
        }
    }
    Ok(())
}
