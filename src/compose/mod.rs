//! Content composition - merges data, template output, CSS and assets into
//! deliverable HTML documents.

pub mod composer;
pub mod document;
pub mod handlers;

pub use composer::{RenderMetadata, RenderedTemplate, ResumeComposer};
pub use document::HtmlDocumentBuilder;
