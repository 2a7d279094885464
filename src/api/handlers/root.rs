use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Lyceum API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Course catalog, enrollment and payment settlement backend",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth/login",
            "courses": "/api/courses",
            "payments": "/api/payments",
            "enrollments": "/api/user-courses"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
