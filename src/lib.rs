use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use serde::{Deserialize, Serialize};

pub mod asset;
pub mod compose;
pub mod config;
pub mod css;
pub mod data;
pub mod error;
pub mod markdown;
pub mod pdf;
pub mod template;

use crate::compose::ResumeComposer;
use crate::config::AppPaths;
use crate::pdf::{PdfGenerator, PdfSettings};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Process-scoped services, shared across workers. Explicitly constructed
/// so tests can build isolated instances against scratch directories.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<ResumeComposer>,
    pub pdf: Arc<PdfGenerator>,
}

impl AppState {
    pub fn new(paths: AppPaths, settings: PdfSettings) -> Self {
        let composer = Arc::new(ResumeComposer::new(paths.clone()));
        let pdf = Arc::new(PdfGenerator::new(
            composer.clone(),
            settings,
            paths.output_dir,
        ));
        AppState { composer, pdf }
    }
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let paths = AppPaths::from_env();
    let settings = PdfSettings::from_env();
    let port: u16 = config::env_parse("PORT", 8080);

    let app_state = web::Data::new(AppState::new(paths.clone(), settings));

    log::info!(
        "starting resume render server at http://0.0.0.0:{port} (data root: {})",
        paths.root.display()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(app_state.clone())
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/resumes")
                            .route(web::get().to(compose::handlers::get_resume_types)),
                    )
                    .service(
                        web::resource("/templates")
                            .route(web::get().to(compose::handlers::get_templates)),
                    )
                    .service(
                        web::resource("/resume/{resume_type}/content")
                            .route(web::get().to(compose::handlers::render_resume_content)),
                    )
                    .service(
                        web::resource("/resume/{resume_type}")
                            .route(web::get().to(compose::handlers::render_resume)),
                    )
                    .service(
                        web::resource("/pdf/metrics")
                            .route(web::get().to(pdf::handlers::performance_metrics))
                            .route(web::delete().to(pdf::handlers::clear_performance_metrics)),
                    )
                    .service(
                        web::resource("/pdf/{resume_type}")
                            .route(web::post().to(pdf::handlers::generate_pdf)),
                    )
                    .service(
                        web::resource("/cache/clear")
                            .route(web::post().to(compose::handlers::clear_cache)),
                    )
                    .service(
                        web::resource("/cache/stats")
                            .route(web::get().to(compose::handlers::cache_stats)),
                    )
                    .service(web::resource("/health").route(web::get().to(pdf::handlers::health))),
            )
            .service(Files::new("/styles", paths.styles_dir.clone()))
            .service(Files::new("/resumes/styles", paths.resumes_dir.join("styles")))
            .service(Files::new("/data", paths.data_dir.clone()))
            .service(Files::new("/generated-pdfs", paths.output_dir.clone()))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
