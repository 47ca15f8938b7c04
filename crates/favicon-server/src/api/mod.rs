mod icons;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use favicon_resolver::FaviconResolver;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{cache_control_value, request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub resolver: FaviconResolver,
    pub cache_control: HeaderValue,
}

impl AppState {
    pub fn new(resolver: FaviconResolver, cache_max_age_secs: u64) -> Self {
        Self {
            resolver,
            cache_control: cache_control_value(cache_max_age_secs),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("x-request-id")])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

/// Icon routes; responses are cacheable.
///
/// A path with no mode prefix is treated as text mode.
fn icon_router(cache_control: HeaderValue) -> Router<AppState> {
    Router::new()
        .route("/", get(icons::empty))
        .route("/text/{*query}", get(icons::text))
        .route("/blob/{*query}", get(icons::blob))
        .route("/list/{*query}", get(icons::list))
        .route("/{*query}", get(icons::text))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            cache_control,
        ))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/debug/{*query}", get(icons::debug));

    Router::new()
        .merge(public_routes)
        .merge(icon_router(state.cache_control.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
