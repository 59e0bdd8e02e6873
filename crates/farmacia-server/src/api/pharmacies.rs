use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Response,
    Extension, Json,
};
use farmacia_core::{paginate, FilterSelection, PageRequest, Pharmacy};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    cached, with_dataset, ApiError, AppState, QueryParams, INTERNAL_ERROR, LISTING_CACHE_CONTROL,
    READ_FAILED,
};

#[derive(Debug, Deserialize)]
struct LookupRequest {
    #[serde(alias = "ids")]
    cnpjs: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
pub(super) struct LookupResponse {
    data: Vec<Pharmacy>,
}

/// GET /api/pharmacies
pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    // page/limit stay strings so malformed values fall back to defaults
    // instead of rejecting the request.
    let query = QueryParams::new(pairs);
    let filters = FilterSelection::new(
        query.single("state").as_deref(),
        query.single("city").as_deref(),
        query.single("neighborhood").as_deref(),
    );
    let request = PageRequest::from_params(
        query.single("page").as_deref(),
        query.single("limit").as_deref(),
    );

    let pharmacies = with_dataset(&state, &req_id, READ_FAILED, move |d| d.read(&filters)).await?;
    Ok(cached(LISTING_CACHE_CONTROL, paginate(pharmacies, request)))
}

/// POST /api/pharmacies/by-cnpj
pub(super) async fn pharmacies_by_cnpj(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<LookupResponse>, ApiError> {
    let cnpjs = parse_lookup(&body).ok_or_else(|| ApiError::bad_request("CNPJs array is required"))?;

    if cnpjs.is_empty() {
        return Ok(Json(LookupResponse { data: Vec::new() }));
    }

    let data = with_dataset(&state, &req_id, INTERNAL_ERROR, move |d| {
        d.find_by_cnpjs(&cnpjs)
    })
    .await?;
    Ok(Json(LookupResponse { data }))
}

/// Extracts the identifier list from a lookup body.
///
/// Returns `None` when the body is not JSON or the list is missing or not an
/// array. Non-string entries can never match a record and are dropped.
fn parse_lookup(body: &[u8]) -> Option<Vec<String>> {
    let request: LookupRequest = serde_json::from_slice(body).ok()?;
    Some(
        request
            .cnpjs?
            .into_iter()
            .filter_map(|v| v.as_str().map(ToOwned::to_owned))
            .collect(),
    )
}
