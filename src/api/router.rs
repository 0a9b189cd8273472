use super::handlers::{classes, core, files, grades, students};
use super::types::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(core::health))
        .route("/class", get(classes::list).post(classes::create))
        .route("/student", get(students::list).post(students::create))
        .route(
            "/student/{student_id}",
            put(students::update).delete(students::delete),
        )
        .route("/grade", get(grades::list).post(grades::create))
        .route("/grade/{grade_id}", put(grades::update).delete(grades::delete))
        .route("/grade/import-grades", post(grades::import))
        .route("/grade/import-grades/", post(grades::import))
        .route("/grade/student/{student_id}", get(grades::student_term))
        .route(
            "/grade/student/{student_id}/compare",
            get(grades::student_compare),
        )
        .route(
            "/common/upload-file",
            post(files::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .fallback(core::not_found)
        .method_not_allowed_fallback(core::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
