use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    api::http::{comments as comments_http, health as health_http},
    app::{middleware::security_headers, state::AppState},
    auth::middleware::auth_middleware,
    error::AppError,
    telemetry::request_logging_middleware,
};

pub fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|err| AppError::Internal(format!("CORS_ALLOWED_ORIGIN invalid: {}", err)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]))
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_http::health_handle))
        .route(
            "/complaints/{complaint_id}/comments",
            get(comments_http::list_complaint_comments_handle),
        );

    let authenticated_routes = Router::new()
        .route("/comments", post(comments_http::create_comment_handle))
        .route(
            "/comments/{comment_id}",
            put(comments_http::update_comment_handle)
                .patch(comments_http::update_comment_handle)
                .delete(comments_http::destroy_comment_handle),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(cors)
        .with_state(state)
}
