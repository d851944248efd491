//! HTTP handlers for PDF generation, metrics and service health.

use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde_json::json;

use crate::pdf::PdfOptions;
use crate::AppState;

/// Kick off a PDF render. The result envelope always comes back as JSON;
/// a failed generation is a 500 with the error text and elapsed time.
pub async fn generate_pdf(
    path: web::Path<String>,
    options: Option<web::Json<PdfOptions>>,
    data: web::Data<AppState>,
) -> impl Responder {
    let resume_type = path.into_inner();
    info!("PDF generation requested for '{resume_type}'");

    let result = data
        .pdf
        .generate_pdf(&resume_type, options.map(|o| o.into_inner()))
        .await;

    if result.success {
        HttpResponse::Ok().json(result)
    } else {
        HttpResponse::InternalServerError().json(result)
    }
}

pub async fn performance_metrics(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.pdf.performance_metrics())
}

pub async fn clear_performance_metrics(data: web::Data<AppState>) -> impl Responder {
    data.pdf.clear_performance_metrics();
    HttpResponse::Ok().json(json!({ "status": "cleared" }))
}

/// Composition core is always up if we got here; the browser flag reports
/// the headless instance's responsiveness.
pub async fn health(data: web::Data<AppState>) -> impl Responder {
    let browser_ok = data.pdf.health_check().await;
    HttpResponse::Ok().json(json!({
        "status": if browser_ok { "ok" } else { "degraded" },
        "browser": browser_ok,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
