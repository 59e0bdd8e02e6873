//! HTTP client for the pharmacy directory API.
//!
//! Wraps `reqwest` with status handling and shape validation. Every body is
//! checked by [`crate::validate`] before it is turned into typed values, so a
//! misbehaving server surfaces as [`ClientError::InvalidResponse`].

use std::time::Duration;

use farmacia_core::{ClientConfig, FilterSelection, Page, PageRequest, Pharmacy};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use crate::error::ClientError;
use crate::validate::{self, ShapeError};

/// Client for the `/api/pharmacies` routes.
///
/// Use [`PharmacyApiClient::new`] with a loaded [`ClientConfig`], or
/// [`PharmacyApiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PharmacyApiClient {
    client: Client,
    base_url: Url,
}

impl PharmacyApiClient {
    /// # Errors
    ///
    /// See [`PharmacyApiClient::with_base_url`].
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_base_url(config.request_timeout_secs, &config.api_base_url)
    }

    /// Creates a client rooted at `base_url`.
    ///
    /// A path prefix on the base URL is preserved, so
    /// `http://host/directory` resolves routes under `/directory/api/...`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("farmacia-popular/0.1")
            .build()?;

        // Exactly one trailing slash so relative joins append to the prefix
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Fetches one page of pharmacies matching `filters`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ClientError::InvalidResponse`] if the body is not a page envelope.
    pub async fn list_pharmacies(
        &self,
        filters: &FilterSelection,
        page: PageRequest,
    ) -> Result<Page<Pharmacy>, ClientError> {
        let page_str = page.page.to_string();
        let limit_str = page.limit.to_string();
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(5);
        if let Some(state) = filters.state.as_deref() {
            params.push(("state", state));
        }
        if let Some(city) = filters.city.as_deref() {
            params.push(("city", city));
        }
        if let Some(neighborhood) = filters.neighborhood.as_deref() {
            params.push(("neighborhood", neighborhood));
        }
        params.push(("page", &page_str));
        params.push(("limit", &limit_str));

        let url = self.build_url("api/pharmacies", &params)?;
        let body = Self::request_json(self.client.get(url.clone()), &url).await?;
        validate::pharmacy_page(body).map_err(|e| invalid(&url, e))
    }

    /// # Errors
    ///
    /// Same failure modes as [`PharmacyApiClient::list_pharmacies`].
    pub async fn list_states(&self) -> Result<Vec<String>, ClientError> {
        self.string_list("api/pharmacies/states", &[]).await
    }

    /// # Errors
    ///
    /// Same failure modes as [`PharmacyApiClient::list_pharmacies`].
    pub async fn list_cities(&self, state: &str) -> Result<Vec<String>, ClientError> {
        self.string_list("api/pharmacies/cities", &[("state", state)])
            .await
    }

    /// # Errors
    ///
    /// Same failure modes as [`PharmacyApiClient::list_pharmacies`].
    pub async fn list_neighborhoods(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.string_list(
            "api/pharmacies/neighborhoods",
            &[("city", city), ("state", state)],
        )
        .await
    }

    /// Looks up full records for a set of CNPJs.
    ///
    /// An empty `cnpjs` short-circuits to an empty result without a request.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PharmacyApiClient::list_pharmacies`].
    pub async fn pharmacies_by_cnpj(&self, cnpjs: &[String]) -> Result<Vec<Pharmacy>, ClientError> {
        if cnpjs.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.build_url("api/pharmacies/by-cnpj", &[])?;
        let request = self
            .client
            .post(url.clone())
            .json(&serde_json::json!({ "cnpjs": cnpjs }));
        let body = Self::request_json(request, &url).await?;
        validate::pharmacy_list(body).map_err(|e| invalid(&url, e))
    }

    async fn string_list(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<String>, ClientError> {
        let url = self.build_url(path, params)?;
        let body = Self::request_json(self.client.get(url.clone()), &url).await?;
        validate::string_list(body).map_err(|e| invalid(&url, e))
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends `request`, rejects non-2xx statuses, and parses the body as JSON.
    ///
    /// The server's `{"error": ..}` message, when present, is carried on
    /// [`ClientError::UnexpectedStatus`].
    async fn request_json(request: RequestBuilder, url: &Url) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body).ok().and_then(|v| {
                v.get("error")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            });
            tracing::warn!(url = %url, status = status.as_u16(), "pharmacy API request failed");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
            context: url.to_string(),
            reason: format!("body is not JSON: {e}"),
        })
    }
}

fn invalid(url: &Url, err: ShapeError) -> ClientError {
    ClientError::InvalidResponse {
        context: url.to_string(),
        reason: err.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PharmacyApiClient {
        PharmacyApiClient::with_base_url(30, base_url).expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_route_to_root() {
        let client = test_client("http://localhost:3000");
        let url = client
            .build_url("api/pharmacies/cities", &[("state", "MG")])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/pharmacies/cities?state=MG"
        );
    }

    #[test]
    fn build_url_keeps_path_prefix() {
        let client = test_client("http://localhost:3000/directory/");
        let url = client.build_url("api/pharmacies/states", &[]).expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/directory/api/pharmacies/states"
        );
    }

    #[test]
    fn build_url_encodes_spaces() {
        let client = test_client("http://localhost:3000");
        let url = client
            .build_url("api/pharmacies/neighborhoods", &[("city", "BELO HORIZONTE")])
            .expect("url");
        assert!(
            url.as_str().contains("city=BELO+HORIZONTE"),
            "query param should be form-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = PharmacyApiClient::with_base_url(30, "not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }), "got: {err}");
    }
}
