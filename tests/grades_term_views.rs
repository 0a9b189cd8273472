use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clap::Parser;
use gradebookd::api::{build_router, AppState};
use gradebookd::config::Config;
use gradebookd::{db, uploads};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_app(prefix: &str) -> Router {
    let dir = temp_dir(prefix);
    let args = vec![
        "gradebookd".to_string(),
        "--database".to_string(),
        dir.join("gradebook.sqlite3").to_string_lossy().to_string(),
        "--upload-dir".to_string(),
        dir.join("file").to_string_lossy().to_string(),
    ];
    let config = Config::parse_from(args);
    uploads::ensure_upload_dir(&config.upload_dir).expect("upload dir");
    let pool = db::open_pool(&config.database, 4, config.pool_timeout()).expect("open pool");
    build_router(AppState::new(pool, config))
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn request_ok(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
    let (status, value) = request(app, method, uri, body).await;
    assert!(status.is_success(), "{} {} failed: {}", method, uri, value);
    value.get("data").cloned().unwrap_or(Value::Null)
}

async fn create_class(app: &Router, name: &str) -> String {
    let data = request_ok(app, "POST", "/class", Some(json!({ "name": name }))).await;
    data["id"].as_str().expect("class id").to_string()
}

async fn record(app: &Router, name: &str, class_id: &str, year: &str, semester: &str, exam: &str, score: f64) {
    request_ok(
        app,
        "POST",
        "/grade",
        Some(json!({
            "name": name,
            "class_id": class_id,
            "year": year,
            "semester": semester,
            "exam": exam,
            "score": score,
        })),
    )
    .await;
}

async fn student_id(app: &Router, name: &str) -> String {
    let data = request_ok(app, "GET", &format!("/student?name={}", name), None).await;
    data["data"][0]["id"].as_str().expect("student id").to_string()
}

fn scores(exams: &Value, key: &str) -> Vec<Option<f64>> {
    exams
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|e| e[key].as_f64())
        .collect()
}

#[tokio::test]
async fn partial_term_has_four_slots_with_nulls() {
    let app = spawn_app("gradebook-term-partial");
    let class_id = create_class(&app, "A").await;
    record(&app, "Ann", &class_id, "2024", "1", "1", 88.0).await;
    record(&app, "Ann", &class_id, "2024", "1", "3", 71.5).await;
    // Other terms must not leak in.
    record(&app, "Ann", &class_id, "2024", "2", "2", 99.0).await;

    let id = student_id(&app, "Ann").await;
    let view = request_ok(
        &app,
        "GET",
        &format!("/grade/student/{}?year=2024&semester=1", id),
        None,
    )
    .await;

    let exams = &view["exams"];
    assert_eq!(exams.as_array().map(|a| a.len()), Some(4));
    let keys: Vec<_> = exams
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|e| e["exam"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(keys, vec!["1", "2", "3", "4"]);
    assert_eq!(scores(exams, "score"), vec![Some(88.0), None, Some(71.5), None]);
    assert_eq!(view["term"], json!({ "year": "2024", "semester": "1" }));
}

#[tokio::test]
async fn complete_term_renders_all_null_slots() {
    let app = spawn_app("gradebook-term-complete");
    let class_id = create_class(&app, "A").await;
    for (exam, score) in [("1", 90.0), ("2", 91.0), ("3", 92.0), ("4", 93.0)] {
        record(&app, "Bob", &class_id, "2024", "1", exam, score).await;
    }

    let id = student_id(&app, "Bob").await;
    let view = request_ok(
        &app,
        "GET",
        &format!("/grade/student/{}?year=2024&semester=1", id),
        None,
    )
    .await;
    assert_eq!(scores(&view["exams"], "score"), vec![None, None, None, None]);
}

#[tokio::test]
async fn comparison_uses_prior_year_second_semester() {
    let app = spawn_app("gradebook-term-compare");
    let class_id = create_class(&app, "A").await;
    record(&app, "Cara", &class_id, "2024", "1", "1", 80.0).await;
    record(&app, "Cara", &class_id, "2023", "2", "1", 70.0).await;
    record(&app, "Cara", &class_id, "2023", "2", "2", 60.0).await;
    // Same year, first semester is not the previous term of 2024/1.
    record(&app, "Cara", &class_id, "2024", "2", "2", 10.0).await;

    let id = student_id(&app, "Cara").await;
    let view = request_ok(
        &app,
        "GET",
        &format!("/grade/student/{}/compare?year=2024&semester=1", id),
        None,
    )
    .await;

    assert_eq!(view["current_term"], json!({ "year": "2024", "semester": "1" }));
    assert_eq!(view["previous_term"], json!({ "year": "2023", "semester": "2" }));
    assert_eq!(
        scores(&view["exams"], "current_score"),
        vec![Some(80.0), None, None, None]
    );
    assert_eq!(
        scores(&view["exams"], "previous_score"),
        vec![Some(70.0), Some(60.0), None, None]
    );
}

#[tokio::test]
async fn comparison_of_second_semester_looks_at_first() {
    let app = spawn_app("gradebook-term-compare-second");
    let class_id = create_class(&app, "A").await;
    record(&app, "Dee", &class_id, "2024", "2", "1", 66.0).await;
    record(&app, "Dee", &class_id, "2024", "1", "1", 55.0).await;

    let id = student_id(&app, "Dee").await;
    let view = request_ok(
        &app,
        "GET",
        &format!("/grade/student/{}/compare?year=2024&semester=2", id),
        None,
    )
    .await;
    assert_eq!(view["previous_term"], json!({ "year": "2024", "semester": "1" }));
    assert_eq!(view["exams"][0]["current_score"], 66.0);
    assert_eq!(view["exams"][0]["previous_score"], 55.0);
}

#[tokio::test]
async fn comparison_is_empty_when_previous_term_is_complete() {
    let app = spawn_app("gradebook-term-compare-full");
    let class_id = create_class(&app, "A").await;
    record(&app, "Eli", &class_id, "2024", "1", "1", 80.0).await;
    for exam in ["1", "2", "3", "4"] {
        record(&app, "Eli", &class_id, "2023", "2", exam, 70.0).await;
    }

    let id = student_id(&app, "Eli").await;
    let view = request_ok(
        &app,
        "GET",
        &format!("/grade/student/{}/compare?year=2024&semester=1", id),
        None,
    )
    .await;
    assert_eq!(scores(&view["exams"], "current_score"), vec![None; 4]);
    assert_eq!(scores(&view["exams"], "previous_score"), vec![None; 4]);
}

#[tokio::test]
async fn term_views_validate_inputs() {
    let app = spawn_app("gradebook-term-validate");
    let class_id = create_class(&app, "A").await;
    record(&app, "Fin", &class_id, "2024", "1", "1", 80.0).await;
    let id = student_id(&app, "Fin").await;

    let (status, _) = request(
        &app,
        "GET",
        &format!("/grade/student/{}/compare?year=next&semester=1", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/grade/student/{}?year=2024", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/grade/student/{}?year=2024&semester=5", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "GET",
        "/grade/student/unknown?year=2024&semester=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
}
