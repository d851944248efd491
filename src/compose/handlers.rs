//! HTTP handlers over the composition core. Thin translation only: route
//! parameters in, `RenderedTemplate`/HTML out, `RenderError` to
//! `ErrorResponse`.

use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use crate::error::RenderError;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub template: Option<String>,
}

impl RenderQuery {
    fn template(&self) -> &str {
        self.template.as_deref().unwrap_or("default")
    }
}

/// Map a composition error to its transport shape.
pub fn error_response(err: &RenderError) -> HttpResponse {
    if err.is_validation() {
        HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
    } else if err.is_not_found() {
        HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
    } else {
        error!("render failed: {err}");
        HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
    }
}

pub async fn get_resume_types(data: web::Data<AppState>) -> impl Responder {
    match data.composer.available_resume_types().await {
        Ok(types) => HttpResponse::Ok().json(json!({ "types": types })),
        Err(e) => error_response(&e),
    }
}

pub async fn get_templates(data: web::Data<AppState>) -> impl Responder {
    match data.composer.available_templates().await {
        Ok(templates) => HttpResponse::Ok().json(json!({ "templates": templates })),
        Err(e) => error_response(&e),
    }
}

/// Browser-wrapped document with navigation chrome and linked stylesheets.
pub async fn render_resume(
    path: web::Path<String>,
    query: web::Query<RenderQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    let resume_type = path.into_inner();
    info!("rendering '{resume_type}' for browser (template: {})", query.template());

    match data
        .composer
        .compose_for_browser(&resume_type, query.template())
        .await
    {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered.html),
        Err(e) => error_response(&e),
    }
}

/// Raw content bundle: fragment, CSS, merged data and render metadata.
pub async fn render_resume_content(
    path: web::Path<String>,
    query: web::Query<RenderQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    let resume_type = path.into_inner();

    match data
        .composer
        .compose_for_api(&resume_type, query.template())
        .await
    {
        Ok(rendered) => HttpResponse::Ok().json(rendered),
        Err(e) => error_response(&e),
    }
}

pub async fn clear_cache(data: web::Data<AppState>) -> impl Responder {
    data.composer.clear_cache();
    info!("composition caches cleared");
    HttpResponse::Ok().json(json!({ "status": "cleared" }))
}

pub async fn cache_stats(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.composer.cache_stats().await)
}
