mod filters;
mod pharmacies;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use farmacia_core::{DataUpdateInfo, DatasetError, PharmacyDataset};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

/// Cache policy for the paginated listing.
pub(super) const LISTING_CACHE_CONTROL: &str = "public, max-age=300, s-maxage=300";
/// Cache policy for the filter option lists.
pub(super) const OPTIONS_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

pub(super) const READ_FAILED: &str = "Error reading CSV file";
pub(super) const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<PharmacyDataset>,
    pub update_info: DataUpdateInfo,
}

/// Error response with the fixed `{"error": "..."}` body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    dataset: &'static str,
    data_update: String,
}

/// Runs a dataset operation on the blocking pool.
///
/// Failures are logged with the request ID and surfaced as a 500 carrying
/// only `message`.
pub(super) async fn with_dataset<T, F>(
    state: &AppState,
    req_id: &RequestId,
    message: &'static str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&PharmacyDataset) -> Result<T, DatasetError> + Send + 'static,
{
    let dataset = Arc::clone(&state.dataset);
    match tokio::task::spawn_blocking(move || op(&dataset)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!(request_id = %req_id.0, error = %e, "dataset read failed");
            Err(ApiError::internal(message))
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "dataset task failed");
            Err(ApiError::internal(message))
        }
    }
}

/// Raw query pairs. A key given more than once counts as absent, so
/// `?state=MG&state=SP` behaves like no `state` at all.
pub(super) struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub(super) fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub(super) fn single(&self, key: &str) -> Option<String> {
        let mut values = self.0.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
        let first = values.next()?;
        values.next().is_none().then(|| first.clone())
    }
}

/// Wraps a JSON body with a `Cache-Control` header.
pub(super) fn cached<T: Serialize>(policy: &'static str, body: T) -> Response {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(policy))],
        Json(body),
    )
        .into_response()
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/pharmacies",
            get(pharmacies::list_pharmacies).fallback(method_not_allowed),
        )
        .route(
            "/api/pharmacies/states",
            get(filters::list_states).fallback(method_not_allowed),
        )
        .route(
            "/api/pharmacies/cities",
            get(filters::list_cities).fallback(method_not_allowed),
        )
        .route(
            "/api/pharmacies/neighborhoods",
            get(filters::list_neighborhoods).fallback(method_not_allowed),
        )
        .route(
            "/api/pharmacies/by-cnpj",
            post(pharmacies::pharmacies_by_cnpj).fallback(method_not_allowed),
        )
        .route("/api/health", get(health).fallback(method_not_allowed))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let data_update = state.update_info.display_text();

    match with_dataset(&state, &req_id, READ_FAILED, |d| d.states()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                dataset: "ok",
                data_update,
            }),
        ),
        Err(_) => {
            tracing::warn!(request_id = %req_id.0, "health check: dataset unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    dataset: "unavailable",
                    data_update,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
