use serde_json::json;

use super::LedgerClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{parse_json, parse_unit};
use crate::types::User;

impl LedgerClient {
    /// Bootstrap request that makes the backend set the `XSRF-TOKEN` cookie.
    pub fn build_csrf_cookie(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &self.csrf_path)
    }

    pub fn parse_csrf_cookie(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_unit(response)
    }

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            "/api/login",
            &json!({ "email": email, "password": password }),
        )
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_me(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/me")
    }

    pub fn parse_me(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/api/logout")
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_unit(response)
    }
}
