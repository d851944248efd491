//! PDF generation - headless-browser capture of the PDF-composed document,
//! sized to the measured content box.

pub mod generator;
pub mod handlers;
pub mod settings;

pub use generator::{PdfGenerationResult, PdfGenerator};
pub use settings::{PdfOptions, PdfSettings};
