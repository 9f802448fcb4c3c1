/// Integration tests for the Crewmatch API
///
/// These tests exercise the router end-to-end over an unreachable database:
/// - Authentication enforcement on protected route groups
/// - Request validation and role restrictions on registration
/// - Ownership checks on account endpoints
/// - Health degradation when the database is down
/// - Security headers on every response
///
/// Every asserted path resolves before a database query would succeed, so the
/// suite runs without a PostgreSQL instance.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

/// Test that protected routes reject requests without a token
#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().unwrap();

    for uri in ["/v1/posts", "/v1/users", "/v1/users/invitations"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");

        let body = common::body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }
}

/// Test that a non-bearer authorization header is a 400, not a 401
#[tokio::test]
async fn test_malformed_authorization_header_rejected() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/posts")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

/// Test that a garbage bearer token is rejected
#[tokio::test]
async fn test_invalid_token_rejected() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/posts")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that a refresh token cannot be used as an access token
#[tokio::test]
async fn test_refresh_token_rejected_on_protected_routes() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/posts")
        .header("authorization", format!("Bearer {}", ctx.refresh_token()))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that registration rejects the admin role
#[tokio::test]
async fn test_register_rejects_admin_role() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "username": "mallory",
                "email": "mallory@example.com",
                "password": "Sup3rSecret!",
                "role": "ADMIN"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("volunteer or organizer"));
}

/// Test that registration rejects a password without required classes
#[tokio::test]
async fn test_register_rejects_weak_password() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "lowercaseonly"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "password");
}

/// Test that registration validates the email format
#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "username": "dave",
                "email": "not-an-email",
                "password": "Sup3rSecret!"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Test that updating another user's account is forbidden
#[tokio::test]
async fn test_update_other_user_forbidden() {
    let ctx = TestContext::new().unwrap();
    let other_id = Uuid::new_v4();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/v1/users/{}", other_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({"bio": "new bio"}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "forbidden");
}

/// Test that deleting another user's account is forbidden
#[tokio::test]
async fn test_delete_other_user_forbidden() {
    let ctx = TestContext::new().unwrap();
    let other_id = Uuid::new_v4();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{}", other_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Test that a user cannot promote themselves to admin
#[tokio::test]
async fn test_update_user_rejects_admin_role() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/v1/users/{}", ctx.user_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({"role": "ADMIN"}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test that the refresh endpoint rejects a garbage token
#[tokio::test]
async fn test_refresh_rejects_invalid_token() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/refresh")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"refresh_token": "not.a.jwt"}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that an access token is rejected by the refresh endpoint
#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/refresh")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"refresh_token": ctx.access_token}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that the health endpoint reports degradation when the database is down
#[tokio::test]
async fn test_health_degraded_without_database() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

/// Test that security headers are set on every response
#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/posts")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
    // HSTS only in production mode
    assert!(!headers.contains_key("strict-transport-security"));
}

/// Test that unknown routes return 404
#[tokio::test]
async fn test_unknown_route_returns_404() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/nonexistent")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
