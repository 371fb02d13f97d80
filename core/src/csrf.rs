//! Cookie-session and anti-forgery header policy.
//!
//! # Design
//! The backend authenticates with a session cookie and rejects writes unless
//! the `XSRF-TOKEN` cookie value is echoed in the `X-XSRF-TOKEN` header. The
//! jar is the host-side stand-in for a browser's cookie store: it absorbs
//! `Set-Cookie` headers and renders a `Cookie` header for every request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const XSRF_COOKIE: &str = "XSRF-TOKEN";
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Which default header set a request receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// JSON endpoints: `Accept: application/json`, JSON content type always.
    Json,
    /// File endpoints: `Accept: */*`, JSON content type only with a body.
    Blob,
}

/// Serializes as a plain `{name: value}` map so hosts can persist it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores every `Set-Cookie` of `response`. Cookies expired with
    /// `Max-Age=0` (or a negative age) or set to an empty value are removed.
    pub fn absorb(&mut self, response: &HttpResponse) {
        for raw in response.header_all("set-cookie") {
            self.absorb_one(raw);
        }
    }

    fn absorb_one(&mut self, raw: &str) {
        let mut parts = raw.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let value = value.trim().trim_matches('"');
        let expired = parts.any(|attr| {
            attr.split_once('=').is_some_and(|(k, v)| {
                k.trim().eq_ignore_ascii_case("max-age")
                    && v.trim().parse::<i64>().is_ok_and(|age| age <= 0)
            })
        });
        if expired || value.is_empty() {
            self.cookies.remove(name);
        } else {
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// `a=1; b=2`, or `None` for an empty jar.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let rendered = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(rendered)
    }

    /// The anti-forgery token, percent-decoded the way the backend encodes it.
    pub fn xsrf_token(&self) -> Option<String> {
        let raw = self.get(XSRF_COOKIE)?;
        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        Some(decoded)
    }

    /// True when `method` writes and no token is available yet.
    pub fn needs_preflight(&self, method: HttpMethod) -> bool {
        method.is_write() && self.get(XSRF_COOKIE).is_none()
    }

    /// Adds the default header set to `request`.
    ///
    /// Caller-supplied headers always win; defaults are only added for
    /// names the request does not carry yet.
    pub fn decorate(&self, mut request: HttpRequest, expect: Expect) -> HttpRequest {
        let mut defaults: Vec<(&str, String)> = Vec::with_capacity(5);
        match expect {
            Expect::Json => {
                defaults.push(("Accept", "application/json".to_string()));
                defaults.push(("Content-Type", "application/json".to_string()));
            }
            Expect::Blob => {
                defaults.push(("Accept", "*/*".to_string()));
                if request.body.is_some() {
                    defaults.push(("Content-Type", "application/json".to_string()));
                }
            }
        }
        defaults.push(("X-Requested-With", "XMLHttpRequest".to_string()));
        if let Some(token) = self.xsrf_token() {
            defaults.push((XSRF_HEADER, token));
        }
        if let Some(cookies) = self.cookie_header() {
            defaults.push(("Cookie", cookies));
        }

        for (name, value) in defaults {
            if !request.has_header(name) {
                request.headers.push((name.to_string(), value));
            }
        }
        request
    }
}
