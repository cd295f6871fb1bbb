//! # noteful-api
//!
//! HTTP surface of the noteful service: CRUD endpoints for folders, tags and
//! notes under `/api`, plus health and API documentation routes.

use std::any::Any;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa_swagger_ui::{Config, SwaggerUi};
use uuid::Uuid;

use noteful_core::Repositories;

pub mod config;
pub mod controller;
pub mod error;
pub mod resources;
pub mod telemetry;
pub mod validation;

pub use config::{HttpConfig, ServerConfig};
pub use error::ApiError;

use controller::{resource_routes, Resource};
use resources::{Folders, Notes, Tags};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Mount `R` at `/<COLLECTION>`.
fn mount<R: Resource>(router: Router<AppState>) -> Router<AppState> {
    router.nest(&format!("/{}", R::COLLECTION), resource_routes::<R>())
}

/// Routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    let router = Router::new();
    let router = mount::<Folders>(router);
    let router = mount::<Tags>(router);
    mount::<Notes>(router)
}

/// Build the full application with middleware.
pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            SwaggerUi::new("/docs").config(
                Config::new(["/openapi.yaml"])
                    .try_it_out_enabled(true)
                    .display_request_duration(true),
            ),
        )
        .route("/openapi.yaml", get(openapi_yaml))
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&http.allowed_origins))
        .layer(RequestBodyLimitLayer::new(http.max_body_bytes))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve the OpenAPI document.
async fn openapi_yaml() -> impl IntoResponse {
    const SPEC: &str = include_str!("openapi.yaml");
    ([(header::CONTENT_TYPE, "application/yaml")], SPEC)
}

async fn not_found() -> ApiError {
    ApiError::NotFound { id: None }
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(subsystem = "api", "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "message": "Internal Server Error" })),
    )
        .into_response()
}
