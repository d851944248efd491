//! Environment-driven PDF defaults and the caller-supplied option overlay.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{env_enabled, env_parse};

/// Convert a CSS-ish length (`"0.5in"`, `"48px"`, `"12mm"`, bare pixels)
/// to inches, the unit the print surface expects.
pub fn parse_length_inches(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some(v) = raw.strip_suffix("in") {
        return v.trim().parse().ok();
    }
    if let Some(v) = raw.strip_suffix("px") {
        return v.trim().parse::<f64>().ok().map(|px| px / 96.0);
    }
    if let Some(v) = raw.strip_suffix("cm") {
        return v.trim().parse::<f64>().ok().map(|cm| cm / 2.54);
    }
    if let Some(v) = raw.strip_suffix("mm") {
        return v.trim().parse::<f64>().ok().map(|mm| mm / 25.4);
    }
    raw.parse::<f64>().ok().map(|px| px / 96.0)
}

/// Headless-browser launch parameters.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    /// Transport idle cutoff for the long-lived shared instance.
    pub idle_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            window_width: 1200,
            window_height: 800,
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) resume-render-server/",
                env!("CARGO_PKG_VERSION")
            )
            .to_string(),
            idle_timeout: Duration::from_secs(86_400),
        }
    }
}

/// Process-wide PDF rendering defaults. Caller options overlay these
/// per-field; measured content dimensions then override width/height.
#[derive(Debug, Clone)]
pub struct PdfSettings {
    pub print_background: bool,
    pub scale: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub page_ranges: String,
    pub prefer_css_page_size: bool,
    /// Top-level navigation/content-set and selector budget; exceeding it
    /// fails the generation.
    pub wait_timeout: Duration,
    /// Font-readiness budget; exceeding it degrades gracefully.
    pub font_wait_timeout: Duration,
    pub wait_selector: String,
    pub optimization_enabled: bool,
    pub browser: BrowserSettings,
}

impl Default for PdfSettings {
    fn default() -> Self {
        PdfSettings {
            print_background: true,
            scale: 1.0,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            page_ranges: "1".to_string(),
            prefer_css_page_size: false,
            wait_timeout: Duration::from_millis(30_000),
            font_wait_timeout: Duration::from_millis(5_000),
            wait_selector: ".resume-content".to_string(),
            optimization_enabled: true,
            browser: BrowserSettings::default(),
        }
    }
}

impl PdfSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        PdfSettings {
            print_background: env_enabled("PDF_PRINT_BACKGROUND"),
            scale: env_parse("PDF_SCALE", defaults.scale),
            margin_top: margin_from_env("PDF_MARGIN_TOP"),
            margin_right: margin_from_env("PDF_MARGIN_RIGHT"),
            margin_bottom: margin_from_env("PDF_MARGIN_BOTTOM"),
            margin_left: margin_from_env("PDF_MARGIN_LEFT"),
            page_ranges: std::env::var("PDF_PAGE_RANGES").unwrap_or(defaults.page_ranges),
            prefer_css_page_size: std::env::var("PDF_PREFER_CSS_PAGE_SIZE")
                .map(|v| v == "true")
                .unwrap_or(false),
            wait_timeout: Duration::from_millis(env_parse("PDF_WAIT_TIMEOUT_MS", 30_000u64)),
            font_wait_timeout: Duration::from_millis(env_parse("PDF_FONT_WAIT_TIMEOUT_MS", 5_000u64)),
            wait_selector: std::env::var("PDF_WAIT_SELECTOR").unwrap_or(defaults.wait_selector),
            optimization_enabled: env_enabled("PDF_OPTIMIZATION_ENABLED"),
            browser: BrowserSettings {
                window_width: env_parse("PDF_VIEWPORT_WIDTH", 1200),
                window_height: env_parse("PDF_VIEWPORT_HEIGHT", 800),
                user_agent: std::env::var("PDF_USER_AGENT")
                    .unwrap_or(BrowserSettings::default().user_agent),
                idle_timeout: Duration::from_secs(env_parse("BROWSER_IDLE_TIMEOUT_SECS", 86_400u64)),
            },
        }
    }

    /// Overlay caller options; caller values win per-field.
    pub fn merge(&self, options: &PdfOptions) -> MergedPdfOptions {
        let margin = options.margin.clone().unwrap_or_default();
        MergedPdfOptions {
            width_in: options.width.as_deref().and_then(parse_length_inches),
            height_in: options.height.as_deref().and_then(parse_length_inches),
            print_background: options.print_background.unwrap_or(self.print_background),
            scale: options.scale.unwrap_or(self.scale),
            margin_top: margin
                .top
                .as_deref()
                .and_then(parse_length_inches)
                .unwrap_or(self.margin_top),
            margin_right: margin
                .right
                .as_deref()
                .and_then(parse_length_inches)
                .unwrap_or(self.margin_right),
            margin_bottom: margin
                .bottom
                .as_deref()
                .and_then(parse_length_inches)
                .unwrap_or(self.margin_bottom),
            margin_left: margin
                .left
                .as_deref()
                .and_then(parse_length_inches)
                .unwrap_or(self.margin_left),
            page_ranges: options
                .page_ranges
                .clone()
                .unwrap_or_else(|| self.page_ranges.clone()),
            prefer_css_page_size: options
                .prefer_css_page_size
                .unwrap_or(self.prefer_css_page_size),
        }
    }
}

fn margin_from_env(key: &str) -> f64 {
    std::env::var(key)
        .ok()
        .as_deref()
        .and_then(parse_length_inches)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfMargins {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
}

/// Caller-supplied overrides, shallow-merged over the env defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfOptions {
    pub template: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub print_background: Option<bool>,
    pub margin: Option<PdfMargins>,
    pub prefer_css_page_size: Option<bool>,
    pub page_ranges: Option<String>,
    pub scale: Option<f64>,
}

/// The effective per-request options after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPdfOptions {
    pub width_in: Option<f64>,
    pub height_in: Option<f64>,
    pub print_background: bool,
    pub scale: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub page_ranges: String,
    pub prefer_css_page_size: bool,
}
