//! HTTP-surface tests: the thin handler layer over the composition core.
//! PDF capture routes are exercised elsewhere; nothing here needs a
//! browser binary.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use resume_render_server::compose::handlers;
use resume_render_server::config::AppPaths;
use resume_render_server::pdf::PdfSettings;
use resume_render_server::AppState;

fn app_state(root: &std::path::Path) -> web::Data<AppState> {
    web::Data::new(AppState::new(AppPaths::new(root), PdfSettings::default()))
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state.clone()).service(
                web::scope("/api")
                    .service(
                        web::resource("/resumes").route(web::get().to(handlers::get_resume_types)),
                    )
                    .service(
                        web::resource("/templates").route(web::get().to(handlers::get_templates)),
                    )
                    .service(
                        web::resource("/resume/{resume_type}/content")
                            .route(web::get().to(handlers::render_resume_content)),
                    )
                    .service(
                        web::resource("/resume/{resume_type}")
                            .route(web::get().to(handlers::render_resume)),
                    )
                    .service(
                        web::resource("/cache/clear").route(web::post().to(handlers::clear_cache)),
                    ),
            ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_listings_enumerate_workspace_contents() {
    let workspace = common::workspace();
    let state = app_state(workspace.path());
    let app = service!(state);

    let body: serde_json::Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/resumes").to_request())
            .await;
    assert_eq!(body["types"], serde_json::json!(["staff_platform_engineer"]));

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/templates").to_request(),
    )
    .await;
    assert_eq!(body["templates"], serde_json::json!(["default"]));
}

#[actix_web::test]
async fn test_browser_route_returns_wrapped_html() {
    let workspace = common::workspace();
    let state = app_state(workspace.path());
    let app = service!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/resume/staff_platform_engineer?template=default")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Rivka Stein"));
    assert!(html.contains("<link rel=\"stylesheet\""));
}

#[actix_web::test]
async fn test_content_route_returns_render_bundle() {
    let workspace = common::workspace();
    let state = app_state(workspace.path());
    let app = service!(state);

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/resume/staff_platform_engineer/content")
            .to_request(),
    )
    .await;

    assert!(body["htmlContent"].as_str().unwrap().contains("resume-content"));
    assert!(body["css"].as_str().unwrap().contains("/* base */"));
    assert_eq!(body["metadata"]["resumeType"], "staff_platform_engineer");
    assert!(body["html"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_unknown_identity_is_a_bad_request_with_options() {
    let workspace = common::workspace();
    let state = app_state(workspace.path());
    let app = service!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/resume/not_a_real_type")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BadRequest");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("staff_platform_engineer"));
    assert!(body["timestamp"].as_str().is_some());
}

#[actix_web::test]
async fn test_cache_clear_route_reports_cleared() {
    let workspace = common::workspace();
    let state = app_state(workspace.path());
    let app = service!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/cache/clear").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "cleared");
}
