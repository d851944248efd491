//! CSS assembly - layered stylesheets per rendering context.

pub mod assembler;
mod mod_tests;

pub use assembler::{CssAssembler, CssAssembly, CssContext};
