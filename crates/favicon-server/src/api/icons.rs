use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Reattaches the request's own query string, which belongs to the target
/// URL rather than to this service.
fn full_query(path: String, raw_query: Option<String>) -> String {
    match raw_query {
        Some(raw) if !raw.is_empty() => format!("{path}?{raw}"),
        _ => path,
    }
}

async fn text_response(state: &AppState, query: &str) -> Response {
    let body = state.resolver.resolve_as_text(query).await;
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

pub(super) async fn empty(State(state): State<AppState>) -> Response {
    text_response(&state, "").await
}

pub(super) async fn text(
    State(state): State<AppState>,
    Path(query): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    text_response(&state, &full_query(query, raw_query)).await
}

pub(super) async fn blob(
    State(state): State<AppState>,
    Path(query): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let image = state
        .resolver
        .resolve_as_image(&full_query(query, raw_query))
        .await;
    let content_type = HeaderValue::from_str(&image.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], image.bytes).into_response()
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(query): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> impl IntoResponse {
    let data = state
        .resolver
        .list_candidates(&full_query(query, raw_query))
        .await;
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn debug(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(query): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> impl IntoResponse {
    let data = state.resolver.debug(&full_query(query, raw_query)).await;
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
