//! Media gate: HTTP routes forwarding to Cloudinary.
//!
//! ```text
//! request → RequestArgs (path, query, body) → MediaPlugin op → MediaApi → GateError | JSON
//! ```

pub mod api;
pub mod cardinality;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod plugin;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use error::GateError;
use media_adapter::{CloudinaryClient, MediaApi, Unconfigured};
use media_config::GateConfig;
use plugin::MediaPlugin;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

/// Max request body size: 1 MiB
const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Clone)]
pub struct AppState {
    pub plugin: MediaPlugin,
    pub config: Arc<GateConfig>,
}

impl AppState {
    pub fn new(api: Arc<dyn MediaApi>, config: GateConfig) -> Self {
        Self {
            plugin: MediaPlugin::new(api),
            config: Arc::new(config),
        }
    }

    /// Apply the startup rule: production refuses to run without
    /// credentials, development runs inert.
    pub fn from_config(config: GateConfig) -> Result<Self, GateError> {
        let api: Arc<dyn MediaApi> = match config.require_credentials() {
            Ok(Some(creds)) => {
                let client = CloudinaryClient::new(&config, creds.clone())
                    .map_err(|e| GateError::Internal(e.to_string()))?;
                info!(
                    cloud = %creds.cloud_name,
                    signing = %config.signature_algorithm,
                    "cloudinary client ready"
                );
                Arc::new(client)
            }
            Ok(None) => Arc::new(Unconfigured),
            Err(e) => {
                error!(mode = %config.mode, "{e}");
                return Err(GateError::Internal(e.to_string()));
            }
        };
        Ok(Self::new(api, config))
    }
}

pub fn app(state: AppState) -> Router {
    let timeout = state.config.request_timeout;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/openApi", get(api::open_api))
        .route("/search", get(api::search))
        .route("/search/", get(api::search))
        .route("/search/:expression", get(api::search_expression))
        .route("/assets/search", post(api::search))
        .route("/assets/transform", post(api::transform))
        .route("/assets", post(api::upload))
        .route(
            "/assets/:id",
            put(api::rename_asset).delete(api::destroy_asset),
        )
        .route("/rename", patch(api::rename))
        .route("/destroy", delete(api::destroy))
        .route(
            "/tags/remove_all",
            delete(api::remove_all_tags)
                .post(api::add_remove_all_named)
                .put(api::replace_remove_all_named),
        )
        .route(
            "/tags/:tag",
            post(api::add_tag_named)
                .put(api::replace_tag_named)
                .delete(api::remove_tag_named),
        )
        .route("/add_tag", post(api::add_tag))
        .route("/replace_tag", put(api::replace_tag))
        .route("/remove_tag", delete(api::remove_tag))
        .route("/remove_all_tags", delete(api::remove_all_tags))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(require_json_content_type))
        .with_state(state)
}

/// Middleware: a request that carries a body must declare it as JSON.
async fn require_json_content_type(req: Request, next: Next) -> Response {
    let carries_body = match req.method().as_str() {
        "POST" | "PUT" | "PATCH" | "DELETE" => has_body(&req),
        _ => false, // GET, HEAD, OPTIONS
    };
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);
    if carries_body && !is_json {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({
                "code": "unsupported_media_type",
                "message": "content-type must be application/json"
            })),
        )
            .into_response();
    }
    next.run(req).await
}

fn has_body(req: &Request) -> bool {
    match req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        Some(len) => len > 0,
        None => req.headers().contains_key(header::TRANSFER_ENCODING),
    }
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({"ok": true, "configured": state.plugin.is_configured()}))
}

pub mod test {
    use super::AppState;
    use media_adapter::MediaApi;
    use media_config::GateConfig;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    /// Spawn the gate on a random port in front of `api`. Returns the address
    /// and a JoinHandle that keeps the server alive until dropped.
    pub async fn spawn(api: Arc<dyn MediaApi>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        spawn_with(AppState::new(api, GateConfig::unconfigured())).await
    }

    pub async fn spawn_with(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let app = super::app(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, handle)
    }
}
