use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router: public routes, bearer-protected routes and media files
pub fn app(state: AppState) -> Router {
    let media_root = state.config.storage.media_root.clone();
    let media_prefix = media_mount_point(&state.config.storage.media_url);

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(prefix) = media_prefix {
        router = router.nest_service(&prefix, ServeDir::new(media_root));
    }

    let cors = cors_layer(&state);
    let router = if state.config.api.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
    } else {
        router.layer(cors)
    };
    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/create", post(public::create_user))
        .route("/user/token", post(public::create_token))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.config.api.max_upload_bytes);

    Router::new()
        .route("/user/me", get(protected::user::me).patch(protected::user::update_me))
        .route("/videos", get(protected::videos::list).post(protected::videos::create))
        .route("/pdds", get(protected::pdds::list).post(protected::pdds::create))
        .route(
            "/pdds/:id",
            get(protected::pdds::detail)
                .patch(protected::pdds::partial_update)
                .put(protected::pdds::replace)
                .delete(protected::pdds::delete),
        )
        .route(
            "/pdds/:id/upload-video",
            post(protected::pdds::upload_video).layer(upload_limit),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// `/media/` -> `/media`. Absolute URLs (a CDN) are not served locally.
fn media_mount_point(media_url: &str) -> Option<String> {
    if !media_url.starts_with('/') {
        return None;
    }
    let trimmed = media_url.trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "PDD API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "user": "/user/create, /user/token (public), /user/me (protected)",
            "videos": "/videos (protected)",
            "pdds": "/pdds[/:id][/upload-video] (protected)",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_mount_point_from_url() {
        assert_eq!(media_mount_point("/media/").as_deref(), Some("/media"));
        assert_eq!(media_mount_point("/files").as_deref(), Some("/files"));
        assert_eq!(media_mount_point("/"), None);
        assert_eq!(media_mount_point("https://cdn.example.com/media/"), None);
    }
}
