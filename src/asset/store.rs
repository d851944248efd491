use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{error, warn};
use moka::sync::Cache;

/// Combined Google Fonts stylesheet used by browser-context rendering,
/// where the client fetches fonts itself instead of embedding them.
pub const GOOGLE_FONTS_IMPORT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Montserrat:wght@400;600;700&family=Lato:wght@300;400;700&display=swap";

/// One embedded asset, keyed by its source path.
#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub data_uri: String,
    pub mime_type: String,
    pub size: usize,
    pub original_path: String,
}

/// Reads image/SVG files from disk and memoizes them as base64 data URIs.
///
/// The cache is unbounded and never evicted except by `clear_cache` - the
/// asset universe is a handful of photos, icons and fonts. Lookups are
/// synchronous so template helpers can call into the store mid-render.
pub struct AssetStore {
    cache: Cache<String, AssetInfo>,
    icons_dir: PathBuf,
}

const ICON_TYPES: [&str; 6] = ["email", "location", "link", "github", "website", "phone"];

/// Emoji-codepoint SVG filename for a semantic icon name.
fn icon_codepoint(icon_type: &str) -> Option<&'static str> {
    match icon_type {
        "email" => Some("1f4e7"),
        "location" => Some("1f4cd"),
        "link" => Some("1f517"),
        "github" => Some("1f4bb"),
        "website" => Some("1f310"),
        "phone" => Some("1f4de"),
        _ => None,
    }
}

/// Unicode glyph used when the SVG asset is unavailable.
fn fallback_glyph(icon_type: &str) -> &'static str {
    match icon_type {
        "email" => "\u{2709}",
        "location" => "\u{1f4cd}",
        "link" => "\u{1f517}",
        "github" => "\u{1f4bb}",
        "website" => "\u{1f310}",
        "phone" => "\u{1f4de}",
        _ => "\u{2022}",
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

impl AssetStore {
    pub fn new(icons_dir: PathBuf) -> Self {
        AssetStore {
            cache: Cache::builder().build(),
            icons_dir,
        }
    }

    /// Embed an image file as a base64 data URI. A missing or unreadable
    /// file yields `None`; the caller decides whether that is fatal.
    pub fn embed_image_as_base64(&self, image_path: &Path) -> Option<String> {
        self.embed(image_path, "image")
    }

    /// Embed an SVG file as a base64 data URI.
    pub fn embed_svg_as_base64(&self, svg_path: &Path) -> Option<String> {
        self.embed(svg_path, "svg")
    }

    fn embed(&self, path: &Path, kind: &str) -> Option<String> {
        let cache_key = format!("{kind}-{}", path.display());

        if let Some(info) = self.cache.get(&cache_key) {
            return Some(info.data_uri);
        }

        if !path.exists() {
            warn!("{kind} file not found: {}", path.display());
            return None;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("failed to read {kind} {}: {e}", path.display());
                return None;
            }
        };

        let mime_type = if kind == "svg" {
            "image/svg+xml"
        } else {
            mime_type_for(path)
        };
        let data_uri = format!("data:{mime_type};base64,{}", BASE64.encode(&bytes));

        let info = AssetInfo {
            data_uri: data_uri.clone(),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
            original_path: path.display().to_string(),
        };
        self.cache.insert(cache_key, info);

        Some(data_uri)
    }

    /// Inline HTML for a semantic icon. Falls back to a Unicode glyph when
    /// the SVG asset is unrecognized or missing.
    pub fn icon_html(&self, icon_type: &str, size: &str) -> String {
        let Some(code) = icon_codepoint(icon_type) else {
            return fallback_glyph(icon_type).to_string();
        };

        let svg_path = self.icons_dir.join(format!("{code}.svg"));
        match self.embed_svg_as_base64(&svg_path) {
            Some(data_uri) => format!(
                "<img src=\"{data_uri}\" alt=\"{icon_type}\" style=\"width: {size}; height: {size}; vertical-align: middle; display: inline-block;\">"
            ),
            None => fallback_glyph(icon_type).to_string(),
        }
    }

    /// Warm the icon cache before a PDF render so helper-time lookups are
    /// cache hits.
    pub fn preload_common_assets(&self) {
        for icon_type in ICON_TYPES {
            let _ = self.icon_html(icon_type, "1em");
        }
    }

    pub fn cached_asset(&self, kind: &str, path: &Path) -> Option<AssetInfo> {
        self.cache.get(&format!("{kind}-{}", path.display()))
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// (entry count, summed byte size) of everything currently cached.
    pub fn cache_stats(&self) -> (u64, usize) {
        self.cache.run_pending_tasks();
        let total: usize = self.cache.iter().map(|(_, info)| info.size).sum();
        (self.cache.entry_count(), total)
    }
}
