//! Error taxonomy for the composition pipeline.
//!
//! Library-level functions return `RenderError` on fatal conditions; the PDF
//! generator catches the whole per-request sequence and folds any error into
//! a `PdfGenerationResult` instead of letting it propagate.

use thiserror::Error;

/// Errors raised while assembling CSS layers.
///
/// Kept `Clone` so values can be shared out of the coalescing CSS cache
/// (`moka::future::Cache::try_get_with` hands back `Arc<E>`).
#[derive(Debug, Clone, Error)]
pub enum CssError {
    #[error("{0}")]
    FontConfig(String),
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("invalid font manifest for template '{template}': {message}")]
    Manifest { template: String, message: String },
}

/// Errors raised by the composition core.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error(transparent)]
    Css(#[from] CssError),

    #[error("invalid content dimensions: {width}x{height}px")]
    InvalidContentDimensions { width: f64, height: f64 },

    #[error("template compile failed: {0}")]
    TemplateCompile(#[from] handlebars::TemplateError),

    #[error("template render failed: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RenderError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        RenderError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        RenderError::Json {
            path: path.into(),
            source,
        }
    }

    /// True for caller mistakes (unknown resume identity or template name)
    /// that map to a 400-class response rather than a server fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, RenderError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RenderError::NotFound(_) | RenderError::TemplateNotFound(_)
        )
    }
}
