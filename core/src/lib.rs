//! Synchronous API client core for the bookkeeping backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Session` chains the two
//! halves over a host-supplied `Transport`, keeping the cookie jar, the
//! CSRF handshake and the cached user in one explicit object.
//!
//! # Design
//! - `LedgerClient` is stateless: base URL, CSRF bootstrap path and list
//!   policy only.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Backend casing quirks and list envelopes are resolved while decoding;
//!   callers only see normalized types.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod csrf;
pub mod download;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod response;
pub mod session;
pub mod store;
pub mod types;

pub use client::LedgerClient;
pub use config::ClientConfig;
pub use csrf::CookieJar;
pub use download::{content_disposition_filename, FileDownload, Report};
pub use envelope::{ListEnvelope, ListPolicy};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use response::{parse_api_response, ApiBody};
pub use session::Session;
pub use store::{FileUserStore, MemoryUserStore, UserCache, UserStore};
pub use types::*;
