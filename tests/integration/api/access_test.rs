//! Email-domain access gate tests

use axum::http::{header, Method, StatusCode};
use classchat::backend::auth::DirectoryUser;
use classchat::backend::routes::create_router;
use classchat::backend::AppState;
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use crate::common::{body_text, request, test_app, test_config, ASHA, OUTSIDER, RAVI};

fn redirect_target(response: &axum::http::Response<axum::body::Body>) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_foreign_domain_is_redirected_from_api() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/messages", Some(OUTSIDER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(redirect_target(&response), Some("/unauthorized"));
}

#[tokio::test]
async fn test_foreign_domain_is_redirected_from_pages() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/chat", Some(OUTSIDER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_domain_match_ignores_case() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/messages", Some(RAVI), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_user_is_redirected() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/messages", Some(("user_ghost", "ghost@sahyadri.edu.in")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_user_without_email_is_redirected() {
    let (state, app) = test_app().await;
    let mut user = DirectoryUser::new("user_noemail", "x@sahyadri.edu.in");
    user.email_addresses.clear();
    state.directory.upsert(user).await.unwrap();

    let response = app
        .oneshot(request(Method::GET, "/api/messages", Some(("user_noemail", "x@sahyadri.edu.in")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_unauthorized_page_is_reachable() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/unauthorized", Some(OUTSIDER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("@sahyadri.edu.in"));
}

#[tokio::test]
async fn test_assets_skip_the_gate() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/logo.png", Some(OUTSIDER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_skip_the_gate() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "week 1 notes").unwrap();
    let mut config = test_config();
    config.static_dir = dir.path().to_path_buf();
    let state = AppState::in_memory(config);
    state
        .directory
        .upsert(DirectoryUser::new(OUTSIDER.0, OUTSIDER.1))
        .await
        .unwrap();
    let app = create_router(state);

    let response = app
        .oneshot(request(Method::GET, "/static/notes.txt", Some(OUTSIDER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "week 1 notes");
}

#[tokio::test]
async fn test_signed_out_requests_pass() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/messages", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_class_member_reaches_api() {
    let (_, app) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/auth/me", Some(ASHA), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
