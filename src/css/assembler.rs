use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::warn;
use moka::future::Cache;

use crate::config::AppPaths;
use crate::error::{CssError, RenderError};
use crate::template::ManifestStore;

/// Which CSS layers a render needs and how fonts are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssContext {
    pub for_pdf: bool,
    pub template: Option<String>,
    pub include_fonts: bool,
    pub include_icons: bool,
}

impl Default for CssContext {
    fn default() -> Self {
        CssContext {
            for_pdf: false,
            template: None,
            include_fonts: true,
            include_icons: true,
        }
    }
}

impl CssContext {
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or("default")
    }

    /// Exact cache key tuple; equivalent contexts must collide.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.for_pdf,
            self.template_name(),
            self.include_fonts,
            self.include_icons
        )
    }
}

/// The four stylesheet layers plus their ordered concatenation.
#[derive(Debug, Clone)]
pub struct CssAssembly {
    pub base_css: String,
    pub template_css: String,
    pub font_css: String,
    pub icon_css: String,
    pub complete_css: String,
}

/// Order matters for the cascade: base, template, font, icon. Empty layers
/// are skipped, survivors join with a blank line.
fn combine(parts: [&str; 4]) -> String {
    parts
        .iter()
        .filter(|css| !css.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Loads and concatenates CSS layers per rendering context, memoized by the
/// context key. Concurrent requests for the same key share one disk pass.
pub struct CssAssembler {
    paths: AppPaths,
    manifests: Arc<ManifestStore>,
    cache: Cache<String, CssAssembly>,
}

impl CssAssembler {
    pub fn new(paths: AppPaths, manifests: Arc<ManifestStore>) -> Self {
        CssAssembler {
            paths,
            manifests,
            cache: Cache::builder().build(),
        }
    }

    pub async fn get_complete_css(&self, context: &CssContext) -> Result<String, CssError> {
        Ok(self.get_css_assembly(context).await?.complete_css)
    }

    pub async fn get_css_assembly(&self, context: &CssContext) -> Result<CssAssembly, CssError> {
        self.cache
            .try_get_with(context.cache_key(), self.assemble(context))
            .await
            .map_err(|e: Arc<CssError>| (*e).clone())
    }

    async fn assemble(&self, context: &CssContext) -> Result<CssAssembly, CssError> {
        let template = context.template_name().to_string();

        let base_fut = self.read_css_optional(self.paths.base_css_file());
        let template_fut = self.read_css_optional(self.paths.template_css_file(&template));
        let font_fut = async {
            if !context.include_fonts {
                Ok(String::new())
            } else if context.for_pdf {
                self.pdf_font_css(&template).await
            } else {
                self.read_css_optional(self.paths.font_css_file()).await
            }
        };
        let icon_fut = async {
            if context.include_icons {
                self.read_css_optional(self.paths.icon_css_file()).await
            } else {
                Ok(String::new())
            }
        };

        let (base_css, template_css, font_css, icon_css) =
            tokio::try_join!(base_fut, template_fut, font_fut, icon_fut)?;

        let complete_css = combine([&base_css, &template_css, &font_css, &icon_css]);

        Ok(CssAssembly {
            base_css,
            template_css,
            font_css,
            icon_css,
            complete_css,
        })
    }

    /// Browser-context layers tolerate a missing file (empty layer); only
    /// read failures on an existing file are errors.
    async fn read_css_optional(&self, path: PathBuf) -> Result<String, CssError> {
        match tokio::fs::read_to_string(&path).await {
            Ok(css) => Ok(css),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("CSS file not found: {}", path.display());
                Ok(String::new())
            }
            Err(e) => Err(CssError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// PDF-context font layer: every manifest-declared font file embedded as
    /// a base64 `@font-face` rule. Hard-fails on a missing manifest or font
    /// file - a headless render with unembedded fonts silently produces
    /// fallback glyphs instead of erroring.
    async fn pdf_font_css(&self, template: &str) -> Result<String, CssError> {
        let manifest = match self.manifests.get(template).await {
            Ok(manifest) => manifest,
            Err(RenderError::NotFound(_)) => {
                return Err(CssError::FontConfig(format!(
                    "Font configuration not found for template '{template}': {}",
                    self.manifests.manifest_path(template).display()
                )));
            }
            Err(e) => {
                return Err(CssError::Manifest {
                    template: template.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let fonts_dir = self.paths.fonts_dir();
        let mut css = String::new();

        for family in &manifest.fonts {
            for file in &family.files {
                let font_path = fonts_dir.join(&file.file);
                if !font_path.exists() {
                    return Err(CssError::FontConfig(format!(
                        "Font file not found: {}",
                        font_path.display()
                    )));
                }

                let bytes = tokio::fs::read(&font_path).await.map_err(|e| CssError::Read {
                    path: font_path.display().to_string(),
                    message: e.to_string(),
                })?;
                let mime = if file.format == "woff2" {
                    "font/woff2"
                } else {
                    "font/truetype"
                };

                css.push_str(&format!(
                    "\n@font-face {{\n  font-family: '{}';\n  src: url('data:{mime};base64,{}') format('{}');\n  font-weight: {};\n  font-style: {};\n  font-display: swap;\n}}\n",
                    family.name,
                    BASE64.encode(&bytes),
                    file.format,
                    file.weight,
                    file.style,
                ));
            }
        }

        Ok(css)
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.manifests.clear();
    }

    pub async fn cache_stats(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
