//! Compiled-template registry.
//!
//! A template compiles on first use and stays registered until an explicit
//! cache clear. Component-based templates (`<name>/layout.html` plus sibling
//! component files) take precedence over legacy single-file templates
//! (`<name>.html`); components are preloaded under `"<template>:<component>"`
//! keys so the `component` helper can resolve them synchronously mid-render.

use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;

use crate::asset::AssetStore;
use crate::config::AppPaths;
use crate::error::RenderError;
use crate::template::helpers;

pub struct TemplateRegistry {
    paths: AppPaths,
    engine: RwLock<Handlebars<'static>>,
}

impl TemplateRegistry {
    pub fn new(paths: AppPaths, assets: Arc<AssetStore>) -> Self {
        let mut engine = Handlebars::new();
        helpers::register(&mut engine, assets);
        TemplateRegistry {
            paths,
            engine: RwLock::new(engine),
        }
    }

    /// Render a template against merged resume data. The data object must
    /// already carry the active template name under `template`.
    pub async fn render(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        self.ensure_compiled(template_name).await?;
        let html = self.engine.read().render(template_name, data)?;
        Ok(html)
    }

    /// Compile and register a template (and its components) if it is not
    /// already cached. Concurrent calls may both read the files; the second
    /// registration overwrites the first with identical content.
    pub async fn ensure_compiled(&self, template_name: &str) -> Result<(), RenderError> {
        if self.engine.read().get_template(template_name).is_some() {
            return Ok(());
        }

        let layout_path = self.paths.template_layout_file(template_name);
        let legacy_path = self.paths.template_legacy_file(template_name);

        if layout_path.exists() {
            let components = self.load_components(template_name).await?;
            let layout = read_template_file(&layout_path).await?;

            let mut engine = self.engine.write();
            for (component_name, content) in components {
                let key = format!("{template_name}:{component_name}");
                engine.register_template_string(&key, content)?;
            }
            engine.register_template_string(template_name, layout)?;
            debug!("compiled component template '{template_name}'");
            return Ok(());
        }

        if legacy_path.exists() {
            let content = read_template_file(&legacy_path).await?;
            self.engine
                .write()
                .register_template_string(template_name, content)?;
            debug!("compiled legacy template '{template_name}'");
            return Ok(());
        }

        Err(RenderError::TemplateNotFound(format!(
            "{template_name} (checked {} and {})",
            layout_path.display(),
            legacy_path.display()
        )))
    }

    /// Every `.html` sibling of `layout.html` in the template directory.
    async fn load_components(
        &self,
        template_name: &str,
    ) -> Result<Vec<(String, String)>, RenderError> {
        let dir = self.paths.resumes_dir.join(template_name);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?;

        let mut components = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?
        {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.ends_with(".html") || file_name == "layout.html" {
                continue;
            }
            let component_name = file_name.trim_end_matches(".html").to_string();
            let content = read_template_file(&path).await?;
            components.push((component_name, content));
        }
        Ok(components)
    }

    /// Template flavors available on disk: directories holding a
    /// `layout.html`, plus legacy `.html` files.
    pub async fn available_templates(&self) -> Result<Vec<String>, RenderError> {
        let dir = &self.paths.resumes_dir;
        if !dir.exists() {
            return Ok(vec!["default".to_string()]);
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?;

        let mut templates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_dir() {
                if path.join("layout.html").exists() {
                    templates.push(name.to_string());
                }
            } else if let Some(stem) = name.strip_suffix(".html") {
                templates.push(stem.to_string());
            }
        }

        if templates.is_empty() {
            return Ok(vec!["default".to_string()]);
        }
        templates.sort();
        Ok(templates)
    }

    pub fn clear(&self) {
        self.engine.write().clear_templates();
    }

    pub fn compiled_count(&self) -> usize {
        self.engine.read().get_templates().len()
    }
}

async fn read_template_file(path: &Path) -> Result<String, RenderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RenderError::io(format!("reading {}", path.display()), e))
}
