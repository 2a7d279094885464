mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lyceum::{api::create_app, config::Settings, domain::UserRole};

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

#[tokio::test]
async fn test_purchase_flow() -> anyhow::Result<()> {
    let ctx = Arc::new(common::test_context().await?);
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let course = common::create_course(&ctx, &teacher, 9900).await?;
    let app = create_app(ctx.clone(), Arc::new(Settings::default()));

    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(json!({
        "username": "student",
        "email": "student@example.com",
        "password": "password123",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "student");

    let (status, body) = send(&app, "POST", "/api/auth/login", None, Some(json!({
        "username": "student",
        "password": "password123",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let (status, body) = send(&app, "POST", "/api/payments", Some(&token), Some(json!({
        "course_id": course.id,
        "payment_method": "alipay",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"], 99.0);
    assert_eq!(body["method"], "alipay");
    assert_eq!(body["status"], "pending");
    let order_id = body["order_id"].as_str().unwrap_or_default().to_string();
    assert!(order_id.starts_with("ORD-"));
    assert!(body["pay_url"].as_str().unwrap_or_default().ends_with(&order_id));

    let (status, body) = send(&app, "POST", "/api/payments/notify", None, Some(json!({
        "order_id": order_id,
        "transaction_id": "ALI-123",
        "status": "completed",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");

    let (status, body) = send(&app, "GET", &format!("/api/payments/status/{}", order_id), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["amount"].is_number());
    assert_eq!(body["amount"], 99.0);

    let (status, body) = send(&app, "GET", "/api/user-courses", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["list"][0]["course_id"], course.id);
    assert_eq!(body["list"][0]["order_id"], order_id.as_str());
    assert_eq!(body["list"][0]["price"], 99.0);

    let (status, body) = send(&app, "GET", "/api/payments/user?page=1&page_size=5", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["list"][0]["course_title"], "Rust for Beginners");

    let uri = format!("/api/user-courses/{}", course.id);
    let (status, _) = send(&app, "POST", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("/api/courses/{}", course.id), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_count"], 1);

    Ok(())
}

#[tokio::test]
async fn test_auth_and_error_responses() -> anyhow::Result<()> {
    let ctx = Arc::new(common::test_context().await?);
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let course = common::create_course(&ctx, &teacher, 9900).await?;
    let app = create_app(ctx.clone(), Arc::new(Settings::default()));

    let (status, body) = send(&app, "GET", "/api/user-courses", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&app, "GET", "/api/user-courses", Some("not-a-token"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let student = common::create_user(&ctx, "student", UserRole::Student).await?;
    let token = ctx.auth_service.issue_token(&student)?;

    let (status, _) = send(&app, "POST", "/api/courses", Some(&token), Some(json!({
        "title": "Sneaky Course",
        "price": "10.00",
    }))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/payments", Some(&token), Some(json!({
        "course_id": course.id,
        "payment_method": "bitcoin",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("bitcoin"));

    let (status, _) = send(&app, "GET", "/api/payments/status/ORD-missing", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/user-courses/{}", course.id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 1);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unenrolled");

    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 0);

    Ok(())
}

#[tokio::test]
async fn test_teacher_publishes_course() -> anyhow::Result<()> {
    let ctx = Arc::new(common::test_context().await?);
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let token = ctx.auth_service.issue_token(&teacher)?;
    let app = create_app(ctx.clone(), Arc::new(Settings::default()));

    let (status, body) = send(&app, "POST", "/api/courses", Some(&token), Some(json!({
        "title": "Async Rust",
        "description": "Futures and executors",
        "price": "49.90",
        "level": 2,
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], 49.9);
    assert_eq!(body["teacher_id"], teacher.id);
    let id = body["id"].as_i64().unwrap_or_default();

    let (status, body) = send(&app, "PUT", &format!("/api/courses/{}", id), Some(&token), Some(json!({
        "price": 59,
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 59.0);
    assert_eq!(body["title"], "Async Rust");

    let (status, _) = send(&app, "POST", "/api/courses", Some(&token), Some(json!({
        "title": "Too Precise",
        "price": "1.005",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/courses", Some(&token), Some(json!({
        "title": "Too Expensive",
        "price": "79228162514264337593543950335",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount out of range");

    let (status, body) = send(&app, "GET", "/api/courses", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);

    let (status, body) = send(
        &app,
        "GET",
        "/api/courses?page=9223372036854775807&page_size=2",
        None,
        None,
    ).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Page out of range");

    Ok(())
}

#[tokio::test]
async fn test_profile_round_trip() -> anyhow::Result<()> {
    let ctx = Arc::new(common::test_context().await?);
    let student = common::create_user(&ctx, "student", UserRole::Student).await?;
    let token = ctx.auth_service.issue_token(&student)?;
    let app = create_app(ctx.clone(), Arc::new(Settings::default()));

    let (status, body) = send(&app, "GET", "/api/users/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "student");
    assert_eq!(body["nickname"], "student");

    let (status, body) = send(&app, "PUT", "/api/users/profile", Some(&token), Some(json!({
        "nickname": "  Rustacean  ",
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "Rustacean");

    let (status, _) = send(&app, "PUT", "/api/users/profile", Some(&token), Some(json!({
        "nickname": "   ",
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}
