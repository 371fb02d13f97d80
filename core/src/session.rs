//! Signed-in session: cookies, CSRF handshake and the user snapshot.
//!
//! # Design
//! `Session` is the one stateful object of the crate and the only caller of
//! a `Transport`. Every request is decorated from the cookie jar; a write
//! request made before the backend has issued an `XSRF-TOKEN` cookie is
//! preceded by exactly one bootstrap request. There is no retry, backoff,
//! timeout or deduplication: one operation, one round-trip (plus the
//! bootstrap when needed).

use crate::client::LedgerClient;
use crate::csrf::{CookieJar, Expect};
use crate::download::Report;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::store::UserCache;
use crate::types::{
    Company, CompanyCreate, CompanyListParams, CompanyUpdate, CompanyUser, Contractor,
    ContractorCreate, ContractorReportParams, ContractorUpdate, Document, DocumentBookResponse,
    DocumentCreate, DocumentCreateResponse, DocumentListQuery, IdResponse, KpirPeriod, LedgerRow,
    User,
};

pub struct Session<T> {
    client: LedgerClient,
    transport: T,
    cookies: CookieJar,
    user: UserCache,
}

impl<T: Transport> Session<T> {
    pub fn new(client: LedgerClient, transport: T) -> Self {
        Self {
            client,
            transport,
            cookies: CookieJar::new(),
            user: UserCache::new(),
        }
    }

    pub fn with_user_cache(mut self, cache: UserCache) -> Self {
        self.user = cache;
        self
    }

    /// Start from previously saved cookies.
    pub fn with_cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn client(&self) -> &LedgerClient {
        &self.client
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Last user seen by `login` or `me`.
    pub fn current_user(&self) -> Option<&User> {
        self.user.get()
    }

    /// Send a JSON-endpoint request under the session's header policy.
    pub fn send_json(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.send(request, Expect::Json)
    }

    /// Send a file-endpoint request under the session's header policy.
    pub fn send_blob(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.send(request, Expect::Blob)
    }

    fn send(&mut self, request: HttpRequest, expect: Expect) -> Result<HttpResponse, ApiError> {
        if self.cookies.needs_preflight(request.method) {
            let preflight = self.client.build_csrf_cookie();
            let response = self.execute(preflight, Expect::Json)?;
            if !response.is_success() {
                tracing::warn!(status = response.status, "csrf cookie bootstrap failed");
            }
        }
        self.execute(request, expect)
    }

    fn execute(&mut self, request: HttpRequest, expect: Expect) -> Result<HttpResponse, ApiError> {
        let request = self.cookies.decorate(request, expect);
        tracing::debug!(method = request.method.as_str(), url = %request.path, "request");
        let response = self.transport.execute(&request)?;
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.path,
            status = response.status,
            "response"
        );
        self.cookies.absorb(&response);
        Ok(response)
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    /// Ask the backend for a fresh `XSRF-TOKEN` cookie.
    pub fn csrf_cookie(&mut self) -> Result<(), ApiError> {
        let request = self.client.build_csrf_cookie();
        let response = self.send_json(request)?;
        self.client.parse_csrf_cookie(response)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        self.csrf_cookie()?;
        let request = self.client.build_login(email, password)?;
        let response = self.send_json(request)?;
        let user = self.client.parse_login(response)?;
        self.user.set(user.clone())?;
        tracing::info!(user_id = user.id, "signed in");
        Ok(user)
    }

    pub fn me(&mut self) -> Result<User, ApiError> {
        let request = self.client.build_me();
        let response = self.send_json(request)?;
        let user = self.client.parse_me(response)?;
        self.user.set(user.clone())?;
        Ok(user)
    }

    /// Ends the server session. Local state (user snapshot and cookies) is
    /// dropped whether or not the server call succeeds.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        let result = self.logout_request();
        self.cookies.clear();
        let cleared = self.user.clear();
        result.and(cleared)
    }

    fn logout_request(&mut self) -> Result<(), ApiError> {
        self.csrf_cookie()?;
        let request = self.client.build_logout();
        let response = self.send_json(request)?;
        self.client.parse_logout(response)
    }

    // ── Companies ─────────────────────────────────────────────────────────

    pub fn list_companies(&mut self, params: &CompanyListParams) -> Result<Vec<Company>, ApiError> {
        let request = self.client.build_list_companies(params);
        let response = self.send_json(request)?;
        self.client.parse_list_companies(response)
    }

    pub fn get_company(&mut self, id: u64) -> Result<Company, ApiError> {
        let request = self.client.build_get_company(id);
        let response = self.send_json(request)?;
        self.client.parse_get_company(response)
    }

    pub fn create_company(&mut self, input: &CompanyCreate) -> Result<Company, ApiError> {
        let request = self.client.build_create_company(input)?;
        let response = self.send_json(request)?;
        self.client.parse_create_company(response)
    }

    pub fn update_company(&mut self, id: u64, input: &CompanyUpdate) -> Result<Company, ApiError> {
        let request = self.client.build_update_company(id, input)?;
        let response = self.send_json(request)?;
        self.client.parse_update_company(response)
    }

    pub fn delete_company(&mut self, id: u64) -> Result<(), ApiError> {
        let request = self.client.build_delete_company(id);
        let response = self.send_json(request)?;
        self.client.parse_delete_company(response)
    }

    pub fn list_company_users(&mut self, company_id: u64) -> Result<Vec<CompanyUser>, ApiError> {
        let request = self.client.build_list_company_users(company_id);
        let response = self.send_json(request)?;
        self.client.parse_list_company_users(response)
    }

    // ── Contractors ───────────────────────────────────────────────────────

    pub fn list_contractors(&mut self) -> Result<Vec<Contractor>, ApiError> {
        let request = self.client.build_list_contractors();
        let response = self.send_json(request)?;
        self.client.parse_list_contractors(response)
    }

    pub fn create_contractor(&mut self, input: &ContractorCreate) -> Result<IdResponse, ApiError> {
        let request = self.client.build_create_contractor(input)?;
        let response = self.send_json(request)?;
        self.client.parse_create_contractor(response)
    }

    pub fn update_contractor(
        &mut self,
        id: u64,
        input: &ContractorUpdate,
    ) -> Result<IdResponse, ApiError> {
        let request = self.client.build_update_contractor(id, input)?;
        let response = self.send_json(request)?;
        self.client.parse_update_contractor(response)
    }

    pub fn delete_contractor(&mut self, id: u64) -> Result<(), ApiError> {
        let request = self.client.build_delete_contractor(id);
        let response = self.send_json(request)?;
        self.client.parse_delete_contractor(response)
    }

    // ── Documents ─────────────────────────────────────────────────────────

    pub fn list_documents(&mut self, query: &DocumentListQuery) -> Result<Vec<Document>, ApiError> {
        let request = self.client.build_list_documents(query);
        let response = self.send_json(request)?;
        self.client.parse_list_documents(response)
    }

    pub fn create_document(
        &mut self,
        input: &DocumentCreate,
    ) -> Result<DocumentCreateResponse, ApiError> {
        let request = self.client.build_create_document(input)?;
        let response = self.send_json(request)?;
        self.client.parse_create_document(response)
    }

    pub fn book_document(&mut self, id: u64) -> Result<DocumentBookResponse, ApiError> {
        let request = self.client.build_book_document(id);
        let response = self.send_json(request)?;
        self.client.parse_book_document(response)
    }

    pub fn list_ledger(&mut self) -> Result<Vec<LedgerRow>, ApiError> {
        let request = self.client.build_list_ledger();
        let response = self.send_json(request)?;
        self.client.parse_list_ledger(response)
    }

    // ── Reports ───────────────────────────────────────────────────────────

    pub fn kpir_report(&mut self, period: &KpirPeriod) -> Result<Report, ApiError> {
        let request = self.client.build_kpir_report(period)?;
        let response = self.send_blob(request)?;
        self.client.parse_kpir_report(period, response)
    }

    pub fn contractors_report(&mut self, params: &ContractorReportParams) -> Result<Report, ApiError> {
        let request = self.client.build_contractors_report(params)?;
        let response = self.send_blob(request)?;
        self.client.parse_contractors_report(params, response)
    }
}
