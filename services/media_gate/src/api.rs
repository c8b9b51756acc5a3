use crate::error::GateError;
use crate::extract::RequestArgs;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub type ApiResult = Result<Json<Value>, GateError>;
/// Ordered pairs so a repeated key keeps every value.
type QueryArgs = Query<Vec<(String, String)>>;

fn collect_args(Query(query): QueryArgs, body: &Bytes) -> Result<RequestArgs, GateError> {
    RequestArgs::from_parts(query, body)
}

// ── search ──────────────────────────────────────────────────────

pub async fn search(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.search(&args).await?))
}

pub async fn search_expression(
    State(state): State<AppState>,
    Path(expression): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("expression", expression);
    Ok(Json(state.plugin.search(&args).await?))
}

// ── transform / upload ──────────────────────────────────────────

pub async fn transform(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.transform(&args).await?))
}

pub async fn upload(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.upload(&args).await?))
}

// ── rename ──────────────────────────────────────────────────────

pub async fn rename(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.rename(&args).await?))
}

/// `PUT /assets/:id`: the path names the asset being renamed.
pub async fn rename_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("from_public_id", id);
    Ok(Json(state.plugin.rename(&args).await?))
}

// ── destroy ─────────────────────────────────────────────────────

pub async fn destroy(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.destroy(&args).await?))
}

pub async fn destroy_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("public_id", id);
    Ok(Json(state.plugin.destroy(&args).await?))
}

// ── tags ────────────────────────────────────────────────────────

pub async fn add_tag(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.add_tag(&args).await?))
}

pub async fn add_tag_named(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("tag", tag);
    Ok(Json(state.plugin.add_tag(&args).await?))
}

pub async fn replace_tag(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.replace_tag(&args).await?))
}

pub async fn replace_tag_named(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("tag", tag);
    Ok(Json(state.plugin.replace_tag(&args).await?))
}

pub async fn remove_tag(State(state): State<AppState>, query: QueryArgs, body: Bytes) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.remove_tag(&args).await?))
}

pub async fn remove_tag_named(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("tag", tag);
    Ok(Json(state.plugin.remove_tag(&args).await?))
}

/// `/tags/remove_all` is a static route, so POST and PUT on it would never
/// reach `/tags/:tag`. They address a tag literally named `remove_all`.
const REMOVE_ALL_SEGMENT: &str = "remove_all";

pub async fn add_remove_all_named(
    State(state): State<AppState>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("tag", REMOVE_ALL_SEGMENT);
    Ok(Json(state.plugin.add_tag(&args).await?))
}

pub async fn replace_remove_all_named(
    State(state): State<AppState>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?.with_arg("tag", REMOVE_ALL_SEGMENT);
    Ok(Json(state.plugin.replace_tag(&args).await?))
}

pub async fn remove_all_tags(
    State(state): State<AppState>,
    query: QueryArgs,
    body: Bytes,
) -> ApiResult {
    let args = collect_args(query, &body)?;
    Ok(Json(state.plugin.remove_all_tags(&args).await?))
}

// ── openApi ─────────────────────────────────────────────────────

pub async fn open_api() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        crate::openapi::OPENAPI_JSON,
    )
}
