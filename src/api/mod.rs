pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        .nest("/api", api_routes(app_state.clone()))

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(state.clone()))
        .nest("/courses", course_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/user-courses", enrollment_routes(state))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::users::profile).put(handlers::users::update_profile))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn course_routes(state: AppState) -> Router<AppState> {
    // Browsing the catalog is public; publishing needs a token
    let public = Router::new()
        .route("/", get(handlers::courses::list))
        .route("/:id", get(handlers::courses::get));

    let protected = Router::new()
        .route("/", post(handlers::courses::create))
        .route("/:id", put(handlers::courses::update))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ));

    public.merge(protected)
}

fn payment_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(handlers::payments::create))
        .route("/user", get(handlers::payments::list_for_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ));

    // Status polling and gateway callbacks carry no user token
    let public = Router::new()
        .route("/status/:order_id", get(handlers::payments::status))
        .route("/notify", post(handlers::payments::notify));

    protected.merge(public)
}

fn enrollment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::enrollments::list))
        .route(
            "/:course_id",
            post(handlers::enrollments::enroll)
                .get(handlers::enrollments::get)
                .delete(handlers::enrollments::unenroll),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
