//! Template registry
//!
//! Loads service-line templates from a directory of JSON files at startup
//! and resolves them by id. A template id that does not resolve is a
//! terminal condition for that case's workspace; there is no partial
//! rendering against a missing shape.

use std::collections::BTreeMap;
use std::path::Path;

use pacw_common::models::Template;
use pacw_common::{Error, Result};

/// In-memory registry of service-line templates
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Load every `*.json` template under `dir`
    ///
    /// Files that fail to parse or lack an id are skipped with a warning;
    /// an unreadable directory is a configuration error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::Config(format!("Cannot read templates directory {:?}: {}", dir, e))
        })?;

        let mut templates = BTreeMap::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::Config(format!("Cannot read templates directory: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Cannot read template {:?}: {}", path, e)))?;
            match serde_json::from_str::<Template>(&content) {
                Ok(template) if !template.id.is_empty() => {
                    tracing::debug!(template_id = %template.id, path = ?path, "Loaded template");
                    templates.insert(template.id.clone(), template);
                }
                Ok(_) => {
                    tracing::warn!(path = ?path, "Skipping template without an id");
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Skipping unparseable template");
                }
            }
        }

        tracing::info!(count = templates.len(), "Template registry loaded");
        Ok(Self { templates })
    }

    /// Build a registry from already-constructed templates (tests, embedding)
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|template| (template.id.clone(), template))
                .collect(),
        }
    }

    /// Resolve a template by id; unresolvable ids are fatal for the workspace
    pub fn resolve(&self, template_id: &str) -> Result<&Template> {
        self.templates.get(template_id).ok_or_else(|| {
            Error::NotFound(format!(
                "Unsupported service line template '{}'",
                template_id
            ))
        })
    }

    pub fn template_ids(&self) -> Vec<&str> {
        self.templates.keys().map(|id| id.as_str()).collect()
    }
}
