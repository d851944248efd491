//! Asset embedding - images, SVG icons and font bytes as data URIs.

mod mod_tests;
pub mod store;

pub use store::{AssetInfo, AssetStore, GOOGLE_FONTS_IMPORT_URL};
