//! Orchestrates the data loader, template renderer, CSS assembler and asset
//! store into deliverable output: browser-wrapped, PDF-wrapped or raw.

use std::sync::Arc;
use std::time::Instant;

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::asset::{AssetStore, GOOGLE_FONTS_IMPORT_URL};
use crate::compose::document::HtmlDocumentBuilder;
use crate::config::AppPaths;
use crate::css::{CssAssembler, CssContext};
use crate::data::{DataLoader, RenderContext};
use crate::error::RenderError;
use crate::template::{ManifestStore, TemplateRegistry};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMetadata {
    pub template: String,
    pub resume_type: String,
    pub render_time_ms: u64,
    pub context: RenderContext,
}

/// One rendered resume. `html` is the full wrapped document and is only set
/// by the browser/PDF wrapping steps; `html_content` is the body fragment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTemplate {
    pub html: String,
    pub html_content: String,
    pub css: String,
    pub data: Value,
    pub metadata: RenderMetadata,
}

pub struct ResumeComposer {
    paths: AppPaths,
    loader: DataLoader,
    templates: Arc<TemplateRegistry>,
    css: CssAssembler,
    assets: Arc<AssetStore>,
    manifests: Arc<ManifestStore>,
}

impl ResumeComposer {
    pub fn new(paths: AppPaths) -> Self {
        let assets = Arc::new(AssetStore::new(paths.icons_dir()));
        let manifests = Arc::new(ManifestStore::new(paths.clone()));
        ResumeComposer {
            loader: DataLoader::new(paths.clone(), assets.clone()),
            templates: Arc::new(TemplateRegistry::new(paths.clone(), assets.clone())),
            css: CssAssembler::new(paths.clone(), manifests.clone()),
            assets,
            manifests,
            paths,
        }
    }

    /// The shared content-render step: validates identifiers, loads data,
    /// renders the template fragment and assembles the matching CSS.
    pub async fn render_content(
        &self,
        resume_type: &str,
        context: RenderContext,
    ) -> Result<RenderedTemplate, RenderError> {
        let started = Instant::now();

        self.validate(resume_type, &context.template).await?;

        if context.for_pdf {
            self.assets.preload_common_assets();
        }

        let data = self.loader.load_resume_data(resume_type, &context).await?;
        let mut data = serde_json::to_value(&data)
            .map_err(|e| RenderError::json("merged resume data", e))?;
        // The component helper resolves "<template>:<component>" keys from
        // the active template name carried in the data object.
        data["template"] = Value::String(context.template.clone());

        let html_content = self.templates.render(&context.template, &data).await?;

        let css = self
            .css
            .get_complete_css(&CssContext {
                for_pdf: context.for_pdf,
                template: Some(context.template.clone()),
                include_fonts: context.include_fonts,
                include_icons: context.include_icons,
            })
            .await?;

        Ok(RenderedTemplate {
            html: String::new(),
            html_content,
            css,
            data,
            metadata: RenderMetadata {
                template: context.template.clone(),
                resume_type: resume_type.to_string(),
                render_time_ms: started.elapsed().as_millis() as u64,
                context,
            },
        })
    }

    /// Raw content bundle for API consumers that assemble HTML themselves.
    pub async fn compose_for_api(
        &self,
        resume_type: &str,
        template: &str,
    ) -> Result<RenderedTemplate, RenderError> {
        self.render_content(resume_type, RenderContext::browser(template))
            .await
    }

    /// Full document for interactive viewing: linked stylesheets, Google
    /// Fonts preconnects and the navigation chrome. Nothing is inlined -
    /// the browser fetches CSS and fonts itself.
    pub async fn compose_for_browser(
        &self,
        resume_type: &str,
        template: &str,
    ) -> Result<RenderedTemplate, RenderError> {
        let mut content = self
            .render_content(resume_type, RenderContext::browser(template))
            .await?;

        let (navigation, css_paths) =
            tokio::join!(self.load_navigation(), self.template_css_paths(template));

        content.html = HtmlDocumentBuilder::new()
            .title("Resume")
            .head("<link rel=\"preconnect\" href=\"https://fonts.googleapis.com\">")
            .head("<link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin>")
            .head(format!(
                "<link href=\"{GOOGLE_FONTS_IMPORT_URL}\" rel=\"stylesheet\">"
            ))
            .stylesheet_link(&css_paths.0)
            .stylesheet_link(&css_paths.1)
            .body(navigation)
            .body(content.html_content.clone())
            .build();

        Ok(content)
    }

    /// Self-contained document for headless PDF capture: the complete CSS
    /// assembly (fonts embedded as base64) inlined, no chrome.
    pub async fn compose_for_pdf(
        &self,
        resume_type: &str,
        template: &str,
    ) -> Result<RenderedTemplate, RenderError> {
        let mut content = self
            .render_content(resume_type, RenderContext::pdf(template))
            .await?;

        content.html = HtmlDocumentBuilder::new()
            .title("Resume")
            .style(content.css.clone())
            .body(content.html_content.clone())
            .build();

        Ok(content)
    }

    /// Navigation chrome partial. Missing is normal before the dashboard is
    /// installed, never fatal.
    async fn load_navigation(&self) -> String {
        let path = self.paths.navigation_file();
        match tokio::fs::read_to_string(&path).await {
            Ok(nav) => nav,
            Err(_) => {
                warn!("navigation component not found at: {}", path.display());
                String::new()
            }
        }
    }

    /// Stylesheet hrefs for browser-mode `<link>` tags: manifest-declared
    /// when available, conventional locations otherwise.
    async fn template_css_paths(&self, template: &str) -> (String, String) {
        match self.manifests.get(template).await {
            Ok(manifest) => (manifest.css.shared, manifest.css.template),
            Err(_) => (
                "styles/shared.css".to_string(),
                format!("resumes/styles/{template}.css"),
            ),
        }
    }

    /// Reject unknown identities and template flavors with the list of
    /// valid options, before any disk work happens.
    async fn validate(&self, resume_type: &str, template: &str) -> Result<(), RenderError> {
        let (types, templates) = tokio::try_join!(
            self.loader.available_resume_types(),
            self.templates.available_templates(),
        )?;

        if !types.iter().any(|t| t == resume_type) {
            return Err(RenderError::Validation(format!(
                "unknown resume type '{resume_type}'. Available: {}",
                types.join(", ")
            )));
        }
        if !templates.iter().any(|t| t == template) {
            return Err(RenderError::Validation(format!(
                "unknown template '{template}'. Available: {}",
                templates.join(", ")
            )));
        }
        Ok(())
    }

    pub async fn available_resume_types(&self) -> Result<Vec<String>, RenderError> {
        self.loader.available_resume_types().await
    }

    pub async fn available_templates(&self) -> Result<Vec<String>, RenderError> {
        self.templates.available_templates().await
    }

    /// Clear every downstream cache (templates, CSS assemblies, manifests,
    /// embedded assets). The loader holds no cache of its own.
    pub fn clear_cache(&self) {
        self.templates.clear();
        self.css.clear_cache();
        self.assets.clear_cache();
    }

    pub async fn cache_stats(&self) -> Value {
        let (asset_entries, asset_bytes) = self.assets.cache_stats();
        serde_json::json!({
            "templateCacheSize": self.templates.compiled_count(),
            "cssCacheSize": self.css.cache_stats().await,
            "assetCacheSize": asset_entries,
            "assetCacheBytes": asset_bytes,
        })
    }
}
