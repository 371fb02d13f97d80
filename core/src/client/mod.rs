//! Stateless HTTP request builder and response parser for the ledger API.
//!
//! # Design
//! `LedgerClient` holds only configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Cookies, the CSRF handshake and the transport live in
//! `Session`, which chains the two halves.
//!
//! Operations are grouped by backend resource, one file per service.

mod auth;
mod company;
mod contractor;
mod document;
mod report;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, DEFAULT_CSRF_PATH};
use crate::envelope::ListPolicy;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::parse_api_response;

#[derive(Debug, Clone)]
pub struct LedgerClient {
    base_url: String,
    csrf_path: String,
    list_policy: ListPolicy,
}

impl LedgerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_path: DEFAULT_CSRF_PATH.to_string(),
            list_policy: ListPolicy::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
            .with_csrf_path(&config.csrf_path)
            .with_list_policy(config.list_policy)
    }

    pub fn with_csrf_path(mut self, path: &str) -> Self {
        self.csrf_path = normalize_route(path);
        self
    }

    pub fn with_list_policy(mut self, policy: ListPolicy) -> Self {
        self.list_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_policy(&self) -> ListPolicy {
        self.list_policy
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    fn request(&self, method: HttpMethod, route: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(route),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        route: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(route),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Decode a list response through the configured envelope policy.
    fn parse_list<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        let value = parse_api_response(response)?.into_value();
        self.list_policy.decode(value)
    }
}

fn normalize_route(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::json_response;
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = LedgerClient::new("http://localhost:8000/");
        assert_eq!(client.build_me().path, "http://localhost:8000/api/me");
    }

    #[test]
    fn csrf_path_is_rooted() {
        let client = LedgerClient::new("http://h").with_csrf_path("api/sanctum/csrf-cookie");
        assert_eq!(client.build_csrf_cookie().path, "http://h/api/sanctum/csrf-cookie");
    }

    #[test]
    fn strict_policy_rejects_unknown_envelopes() {
        let client = LedgerClient::new("http://h").with_list_policy(ListPolicy::Strict);
        let err = client
            .parse_list_contractors(json_response(200, r#"{"results":[]}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::UnrecognizedEnvelope { .. }));
    }
}
