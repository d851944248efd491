//! Per-template manifests: linked CSS paths and the font-embedding list
//! used for PDF rendering.

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::AppPaths;
use crate::error::RenderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestCss {
    pub shared: String,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontFile {
    pub weight: u32,
    pub style: String,
    pub file: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontFamily {
    pub name: String,
    pub files: Vec<FontFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created: String,
}

/// `resumes/<template>/manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub template: String,
    #[serde(default)]
    pub version: String,
    pub css: ManifestCss,
    pub fonts: Vec<FontFamily>,
    #[serde(default)]
    pub metadata: Option<ManifestMetadata>,
}

impl TemplateManifest {
    fn validate(&self, template_name: &str) -> Result<(), String> {
        if self.template != template_name {
            return Err(format!(
                "template name mismatch: expected '{template_name}', got '{}'",
                self.template
            ));
        }
        if self.css.shared.trim().is_empty() || self.css.template.trim().is_empty() {
            return Err("css paths must not be empty".to_string());
        }
        for font in &self.fonts {
            if font.name.trim().is_empty() || font.files.is_empty() {
                return Err(format!("font entry '{}' is incomplete", font.name));
            }
            for file in &font.files {
                if file.file.trim().is_empty()
                    || file.format.trim().is_empty()
                    || file.style.trim().is_empty()
                {
                    return Err(format!(
                        "font file entry for '{}' is incomplete",
                        font.name
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Loads and caches template manifests. Population is idempotent, so the
/// read/insert race under concurrent renders is benign.
pub struct ManifestStore {
    paths: AppPaths,
    cache: RwLock<HashMap<String, TemplateManifest>>,
}

impl ManifestStore {
    pub fn new(paths: AppPaths) -> Self {
        ManifestStore {
            paths,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn manifest_path(&self, template: &str) -> PathBuf {
        self.paths.template_manifest_file(template)
    }

    /// Load (or return the cached) manifest for a template. Missing file is
    /// a `NotFound`; a malformed manifest is a `Validation`-class failure.
    pub async fn get(&self, template: &str) -> Result<TemplateManifest, RenderError> {
        if let Some(manifest) = self.cache.read().get(template) {
            return Ok(manifest.clone());
        }

        let path = self.manifest_path(template);
        if !path.exists() {
            return Err(RenderError::NotFound(format!(
                "template manifest not found: {}",
                path.display()
            )));
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RenderError::io(format!("reading {}", path.display()), e))?;
        let manifest: TemplateManifest =
            serde_json::from_str(&raw).map_err(|e| RenderError::json(path.display().to_string(), e))?;

        manifest
            .validate(template)
            .map_err(RenderError::Validation)?;

        debug!("template manifest loaded for '{template}'");
        self.cache
            .write()
            .insert(template.to_string(), manifest.clone());
        Ok(manifest)
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }
}
