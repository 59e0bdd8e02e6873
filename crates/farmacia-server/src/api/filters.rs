//! Derived option lists for the cascading filter controls.

use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};

use crate::middleware::RequestId;

use super::{
    cached, with_dataset, ApiError, AppState, QueryParams, OPTIONS_CACHE_CONTROL, READ_FAILED,
};

fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// GET /api/pharmacies/states
pub(super) async fn list_states(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let states = with_dataset(&state, &req_id, READ_FAILED, |d| d.states()).await?;
    Ok(cached(OPTIONS_CACHE_CONTROL, states))
}

/// GET /api/pharmacies/cities?state=
pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = QueryParams::new(pairs);
    let uf = required(query.single("state"), "State parameter is required")?;
    let cities = with_dataset(&state, &req_id, READ_FAILED, move |d| d.cities(&uf)).await?;
    Ok(cached(OPTIONS_CACHE_CONTROL, cities))
}

/// GET /api/pharmacies/neighborhoods?city=&state=
pub(super) async fn list_neighborhoods(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = QueryParams::new(pairs);
    let city = required(query.single("city"), "City parameter is required")?;
    let uf = required(query.single("state"), "State parameter is required")?;
    let neighborhoods = with_dataset(&state, &req_id, READ_FAILED, move |d| {
        d.neighborhoods(&city, &uf)
    })
    .await?;
    Ok(cached(OPTIONS_CACHE_CONTROL, neighborhoods))
}
