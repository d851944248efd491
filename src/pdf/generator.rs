//! Drives a shared headless-browser instance: load the PDF-composed
//! document, wait for fonts and content, measure the rendered content box,
//! emit a PDF sized to it, recompress, write to disk.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::compose::ResumeComposer;
use crate::error::RenderError;
use crate::pdf::settings::{MergedPdfOptions, PdfOptions, PdfSettings};

/// Outcome envelope. PDF generation must never crash the host process, so
/// every failure folds into `{success: false, error}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfGenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generation_time_ms: u64,
}

const BROWSER_ARGS: [&str; 8] = [
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--font-render-hinting=none",
    "--hide-scrollbars",
    "--mute-audio",
    "--no-first-run",
    "--disable-background-networking",
];

pub struct PdfGenerator {
    composer: Arc<ResumeComposer>,
    settings: PdfSettings,
    output_dir: PathBuf,
    /// Lazily launched, shared across requests; each request gets its own
    /// tab. The tokio mutex is held across the launch await so concurrent
    /// first calls cannot race two browser processes into existence.
    browser: tokio::sync::Mutex<Option<Arc<Browser>>>,
    metrics: Mutex<HashMap<String, u64>>,
}

impl PdfGenerator {
    pub fn new(composer: Arc<ResumeComposer>, settings: PdfSettings, output_dir: PathBuf) -> Self {
        PdfGenerator {
            composer,
            settings,
            output_dir,
            browser: tokio::sync::Mutex::new(None),
            metrics: Mutex::new(HashMap::new()),
        }
    }

    pub async fn generate_pdf(
        &self,
        resume_type: &str,
        options: Option<PdfOptions>,
    ) -> PdfGenerationResult {
        let started = Instant::now();

        match self.generate_inner(resume_type, options.unwrap_or_default()).await {
            Ok(file_path) => {
                let generation_time_ms = started.elapsed().as_millis() as u64;
                self.metrics
                    .lock()
                    .insert(resume_type.to_string(), generation_time_ms);
                info!("generated {} in {generation_time_ms}ms", file_path.display());
                PdfGenerationResult {
                    success: true,
                    file_path: Some(file_path.display().to_string()),
                    error: None,
                    generation_time_ms,
                }
            }
            Err(e) => {
                error!("PDF generation for '{resume_type}' failed: {e}");
                PdfGenerationResult {
                    success: false,
                    file_path: None,
                    error: Some(format!("PDF generation failed: {e}")),
                    generation_time_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }

    async fn generate_inner(
        &self,
        resume_type: &str,
        options: PdfOptions,
    ) -> Result<PathBuf, RenderError> {
        let template = options.template.as_deref().unwrap_or("default");
        let composed = self.composer.compose_for_pdf(resume_type, template).await?;

        let browser = self.ensure_browser().await?;
        let merged = self.settings.merge(&options);
        let settings = self.settings.clone();
        let html = composed.html;

        let pdf_bytes = tokio::task::spawn_blocking(move || {
            render_pdf_bytes(&browser, &html, &settings, &merged)
        })
        .await
        .map_err(|e| RenderError::Browser(format!("render task failed: {e}")))??;

        let pdf_bytes = if self.settings.optimization_enabled {
            optimize_pdf(pdf_bytes)
        } else {
            pdf_bytes
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| RenderError::io(format!("creating {}", self.output_dir.display()), e))?;

        let file_path = self
            .output_dir
            .join(output_filename(resume_type, chrono::Utc::now()));

        tokio::fs::write(&file_path, &pdf_bytes)
            .await
            .map_err(|e| RenderError::io(format!("writing {}", file_path.display()), e))?;

        Ok(file_path)
    }

    async fn ensure_browser(&self) -> Result<Arc<Browser>, RenderError> {
        let mut slot = self.browser.lock().await;
        if let Some(browser) = slot.as_ref() {
            return Ok(browser.clone());
        }

        let settings = self.settings.browser.clone();
        let browser = tokio::task::spawn_blocking(move || launch_browser(&settings))
            .await
            .map_err(|e| RenderError::Browser(format!("launch task failed: {e}")))??;

        let browser = Arc::new(browser);
        *slot = Some(browser.clone());
        info!("headless browser launched");
        Ok(browser)
    }

    /// Tear down the shared instance; the next call relaunches lazily.
    pub async fn close(&self) {
        if self.browser.lock().await.take().is_some() {
            info!("headless browser closed");
        }
    }

    /// Open a throwaway page against a trivial document to verify the
    /// browser is responsive. Reports, never throws.
    pub async fn health_check(&self) -> bool {
        let browser = match self.ensure_browser().await {
            Ok(browser) => browser,
            Err(e) => {
                warn!("browser health check failed to initialize: {e}");
                return false;
            }
        };

        let probe = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let tab = browser.new_tab()?;
            let result = tab
                .navigate_to("data:text/html,<html><body>ok</body></html>")
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ());
            let _ = tab.close(true);
            result
        })
        .await;

        match probe {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("browser health check failed: {e}");
                false
            }
            Err(e) => {
                warn!("browser health check task failed: {e}");
                false
            }
        }
    }

    /// Last generation time per resume identity, milliseconds.
    pub fn performance_metrics(&self) -> HashMap<String, u64> {
        self.metrics.lock().clone()
    }

    pub fn clear_performance_metrics(&self) {
        self.metrics.lock().clear();
    }
}

fn launch_browser(settings: &crate::pdf::settings::BrowserSettings) -> Result<Browser, RenderError> {
    let args: Vec<&OsStr> = BROWSER_ARGS.iter().map(OsStr::new).collect();
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((settings.window_width, settings.window_height)))
        .args(args)
        .idle_browser_timeout(settings.idle_timeout)
        .build()
        .map_err(|e| RenderError::Browser(format!("invalid launch options: {e}")))?;

    Browser::new(options)
        .map_err(|e| RenderError::Browser(format!("failed to launch headless browser: {e}")))
}

/// Per-request page sequence. The tab always closes, success or not; the
/// shared browser stays up.
fn render_pdf_bytes(
    browser: &Browser,
    html: &str,
    settings: &PdfSettings,
    merged: &MergedPdfOptions,
) -> Result<Vec<u8>, RenderError> {
    let tab = browser
        .new_tab()
        .map_err(|e| RenderError::Browser(format!("failed to open page: {e}")))?;

    let result = drive_page(&tab, html, settings, merged);
    if let Err(e) = tab.close(true) {
        warn!("failed to close page: {e}");
    }
    result
}

fn drive_page(
    tab: &Arc<Tab>,
    html: &str,
    settings: &PdfSettings,
    merged: &MergedPdfOptions,
) -> Result<Vec<u8>, RenderError> {
    tab.set_default_timeout(settings.wait_timeout);
    tab.set_user_agent(&settings.browser.user_agent, None, None)
        .map_err(|e| RenderError::Browser(format!("failed to set user agent: {e}")))?;

    // The document is fully self-contained (inline CSS, embedded fonts and
    // images), so loading it from a scratch file involves no fetches.
    let mut scratch = tempfile::Builder::new()
        .prefix("resume-render-")
        .suffix(".html")
        .tempfile()
        .map_err(|e| RenderError::io("creating scratch document", e))?;
    scratch
        .write_all(html.as_bytes())
        .map_err(|e| RenderError::io("writing scratch document", e))?;

    let url = format!("file://{}", scratch.path().display());
    tab.navigate_to(&url)
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| RenderError::Browser(format!("content load failed: {e}")))?;

    // Fonts are embedded, so readiness normally resolves fast; a stall is
    // tolerated rather than failing the job.
    if wait_for_fonts(tab, settings.font_wait_timeout).is_err() {
        warn!(
            "font loading did not settle within {:?}; continuing with best-effort fonts",
            settings.font_wait_timeout
        );
    }

    tab.wait_for_element_with_custom_timeout(&settings.wait_selector, settings.wait_timeout)
        .map_err(|e| {
            RenderError::Browser(format!(
                "content root '{}' never appeared: {e}",
                settings.wait_selector
            ))
        })?;

    let (width_px, height_px) = measure_content(tab, &settings.wait_selector)?;
    ensure_renderable_dimensions(width_px, height_px)?;
    info!("measured content dimensions: {width_px}x{height_px}px");

    // Page size follows the measured content box (pixels at 96dpi), not a
    // fixed paper size: one continuous page matching content length. Caller
    // width/height are accepted but always overridden by the measurement.
    let options = PrintToPdfOptions {
        print_background: Some(merged.print_background),
        scale: Some(merged.scale),
        paper_width: Some(width_px / 96.0),
        paper_height: Some(height_px / 96.0),
        margin_top: Some(merged.margin_top),
        margin_right: Some(merged.margin_right),
        margin_bottom: Some(merged.margin_bottom),
        margin_left: Some(merged.margin_left),
        page_ranges: Some(merged.page_ranges.clone()),
        prefer_css_page_size: Some(merged.prefer_css_page_size),
        display_header_footer: Some(false),
        ..Default::default()
    };

    tab.print_to_pdf(Some(options))
        .map_err(|e| RenderError::Browser(format!("pdf rendering failed: {e}")))
}

struct FontWaitTimedOut;

/// Bounded poll of the browser's font-loading signal. The caller decides
/// tolerate-vs-fail; this only reports `TimedOut`.
fn wait_for_fonts(tab: &Arc<Tab>, budget: Duration) -> Result<(), FontWaitTimedOut> {
    let deadline = Instant::now() + budget;
    loop {
        if let Ok(result) = tab.evaluate("document.fonts ? document.fonts.status : 'loaded'", false)
        {
            if result.value.as_ref().and_then(|v| v.as_str()) == Some("loaded") {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(FontWaitTimedOut);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[derive(Debug, Deserialize)]
struct MeasuredBox {
    width: Option<f64>,
    height: Option<f64>,
    error: Option<String>,
}

/// Bounding box of the content root including padding and borders, ceil-ed
/// to whole pixels. Serialized through JSON because the devtools protocol
/// only returns primitives by value.
fn measure_content(tab: &Arc<Tab>, selector: &str) -> Result<(f64, f64), RenderError> {
    let script = format!(
        r#"(() => {{
  const el = document.querySelector('{selector}');
  if (!el) {{ return JSON.stringify({{ error: 'content root not found' }}); }}
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  const px = (p) => parseFloat(style[p]) || 0;
  const width = rect.width + px('paddingLeft') + px('paddingRight') + px('borderLeftWidth') + px('borderRightWidth');
  const height = rect.height + px('paddingTop') + px('paddingBottom') + px('borderTopWidth') + px('borderBottomWidth');
  return JSON.stringify({{ width: Math.ceil(width), height: Math.ceil(height) }});
}})()"#
    );

    let result = tab
        .evaluate(&script, false)
        .map_err(|e| RenderError::Browser(format!("content measurement failed: {e}")))?;
    let raw = result
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .ok_or_else(|| RenderError::Browser("content measurement returned no value".to_string()))?;

    let measured: MeasuredBox =
        serde_json::from_str(raw).map_err(|e| RenderError::json("content measurement", e))?;
    if let Some(message) = measured.error {
        return Err(RenderError::Browser(message));
    }

    Ok((
        measured.width.unwrap_or_default(),
        measured.height.unwrap_or_default(),
    ))
}

/// A PDF cannot be meaningfully sized from a non-rendered page; zero or
/// negative measurements are fatal, never substituted.
pub(crate) fn ensure_renderable_dimensions(width_px: f64, height_px: f64) -> Result<(), RenderError> {
    if width_px <= 0.0 || height_px <= 0.0 {
        return Err(RenderError::InvalidContentDimensions {
            width: width_px,
            height: height_px,
        });
    }
    Ok(())
}

/// `<resumeId>-<ISO 8601, ':' and '.' flattened to '-'>.pdf` - the filename
/// is the only externally addressable identifier for a generated artifact.
pub(crate) fn output_filename(resume_type: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    let timestamp = now.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("{}-{timestamp}.pdf", sanitize_filename::sanitize(resume_type))
}

/// Best-effort recompression. Failure keeps the original bytes.
fn optimize_pdf(bytes: Vec<u8>) -> Vec<u8> {
    match try_optimize(&bytes) {
        Ok(optimized) => {
            info!(
                "PDF optimization: {} bytes -> {} bytes",
                bytes.len(),
                optimized.len()
            );
            optimized
        }
        Err(e) => {
            warn!("PDF optimization failed, keeping original buffer: {e}");
            bytes
        }
    }
}

fn try_optimize(bytes: &[u8]) -> Result<Vec<u8>, lopdf::Error> {
    let mut document = lopdf::Document::load_mem(bytes)?;
    document.compress();
    let mut out = Vec::new();
    document.save_to(&mut out)?;
    Ok(out)
}
