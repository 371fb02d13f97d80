//! Session lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives a `Session` over real
//! HTTP using a ureq-backed `Transport`. Validates that request building, the
//! CSRF handshake, cookie handling and response parsing work end-to-end.

use ledger_core::{
    ApiError, CompanyCreate, CompanyListParams, CompanyUpdate, ContractorCreate,
    ContractorReportParams, ContractorUpdate, DocumentCreate, DocumentListQuery, DocumentStatus,
    DocumentType, HttpMethod, HttpRequest, HttpResponse, KpirPeriod, LedgerClient, Session,
    Transport,
};
use mock_server::AppState;
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Body, RequestBuilder};

/// Executes requests with ureq, returning 4xx/5xx responses as data.
struct Ureq(ureq::Agent);

impl Ureq {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Ureq(agent)
    }
}

fn with_headers<B>(mut b: RequestBuilder<B>, req: &HttpRequest) -> RequestBuilder<B> {
    for (k, v) in &req.headers {
        b = b.header(k.as_str(), v.as_str());
    }
    b
}

fn send(b: RequestBuilder<WithBody>, req: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
    let b = with_headers(b, req);
    match &req.body {
        Some(body) => b.send(body.as_bytes()),
        None => b.send_empty(),
    }
}

impl Transport for Ureq {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match req.method {
            HttpMethod::Get => with_headers(self.0.get(&req.path), req).call(),
            HttpMethod::Head => with_headers(self.0.head(&req.path), req).call(),
            HttpMethod::Options => with_headers(self.0.options(&req.path), req).call(),
            HttpMethod::Delete => with_headers(self.0.delete(&req.path), req).call(),
            HttpMethod::Post => send(self.0.post(&req.path), req),
            HttpMethod::Put => send(self.0.put(&req.path), req),
            HttpMethod::Patch => send(self.0.patch(&req.path), req),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Spawns the mock server and returns its base URL and shared state.
fn start_server() -> (String, AppState) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let state = AppState::seeded();
    let server_state = state.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, server_state).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), state)
}

fn session(base_url: &str) -> Session<Ureq> {
    Session::new(LedgerClient::new(base_url), Ureq::new())
}

#[test]
fn first_write_bootstraps_csrf_exactly_once() {
    let (url, state) = start_server();
    let mut s = session(&url);

    // Unauthenticated, but the handshake still happens before the write.
    let err = s
        .create_contractor(&ContractorCreate {
            name: "X".to_string(),
            tax_id: None,
            address: None,
        })
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(state.csrf_requests(), 1);

    // Token is now in the jar: further writes skip the bootstrap.
    let _ = s.create_contractor(&ContractorCreate {
        name: "Y".to_string(),
        tax_id: None,
        address: None,
    });
    assert_eq!(state.csrf_requests(), 1);
}

#[test]
fn login_me_logout() {
    let (url, _state) = start_server();
    let mut s = session(&url);

    let err = s.login("anna@saldo.pl", "wrong").unwrap_err();
    match err {
        ApiError::Http {
            status,
            message,
            errors,
        } => {
            assert_eq!(status, 422);
            assert_eq!(message, "These credentials do not match our records.");
            assert!(errors.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(s.current_user().is_none());

    let user = s.login("anna@saldo.pl", "secret").unwrap();
    assert!(user.is_manager());
    assert_eq!(user.company_id, Some(1));
    assert_eq!(s.current_user().map(|u| u.id), Some(user.id));

    let me = s.me().unwrap();
    assert_eq!(me.email, "anna@saldo.pl");

    s.logout().unwrap();
    assert!(s.current_user().is_none());
    assert!(s.cookies().is_empty());
    assert_eq!(s.me().unwrap_err().status(), Some(401));
}

#[test]
fn companies_crud_through_paginator_envelope() {
    let (url, _state) = start_server();
    let mut s = session(&url);
    s.login("anna@saldo.pl", "secret").unwrap();

    let active = s
        .list_companies(&CompanyListParams {
            active: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].tax_id.as_deref(), Some("5260001246"));

    let created = s
        .create_company(&CompanyCreate {
            name: "Warsztat Zięba".to_string(),
            tax_id: Some("1130000000".to_string()),
            address: None,
            active: None,
        })
        .unwrap();
    assert!(created.active);

    let updated = s
        .update_company(
            created.id,
            &CompanyUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!updated.active);
    assert_eq!(s.get_company(created.id).unwrap().name, "Warsztat Zięba");

    let users = s.list_company_users(1).unwrap();
    assert_eq!(users.len(), 2);

    s.delete_company(created.id).unwrap();
    assert!(s.get_company(created.id).unwrap_err().is_not_found());
}

#[test]
fn contractors_through_items_envelope() {
    let (url, _state) = start_server();
    let mut s = session(&url);
    s.login("jan@saldo.pl", "secret").unwrap();

    let created = s
        .create_contractor(&ContractorCreate {
            name: "Hurtownia Pol".to_string(),
            tax_id: Some("6790000000".to_string()),
            address: None,
        })
        .unwrap();
    let updated = s
        .update_contractor(
            created.id,
            &ContractorUpdate {
                address: Some("Kraków".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.id, created.id);

    let all = s.list_contractors().unwrap();
    let found = all.iter().find(|c| c.id == created.id).unwrap();
    assert_eq!(found.tax_id.as_deref(), Some("6790000000"));
    assert_eq!(found.address.as_deref(), Some("Kraków"));

    s.delete_contractor(created.id).unwrap();
    assert!(s.delete_contractor(created.id).unwrap_err().is_not_found());
}

#[test]
fn document_to_ledger_lifecycle() {
    let (url, _state) = start_server();
    let mut s = session(&url);
    s.login("anna@saldo.pl", "secret").unwrap();

    let created = s
        .create_document(&DocumentCreate {
            doc_type: DocumentType::Cost,
            number: Some("FV/3/2024".to_string()),
            description: Some("Paliwo".to_string()),
            issue_date: "2024-03-05".to_string(),
            contractor_id: Some(1),
            net_amount: 100.0,
            vat_amount: 23.0,
        })
        .unwrap();
    assert_eq!(created.status, Some(DocumentStatus::Buffer));

    let buffer = s
        .list_documents(&DocumentListQuery {
            doc_type: None,
            status: Some(DocumentStatus::Buffer),
        })
        .unwrap();
    let doc = buffer.iter().find(|d| d.id == created.id).unwrap();
    assert_eq!(doc.gross_amount, Some(123.0));
    assert_eq!(doc.contractor_name.as_deref(), Some("Orlen S.A."));
    assert!(!doc.is_booked());

    let booked = s.book_document(created.id).unwrap();
    assert_eq!(booked.status, Some(DocumentStatus::Booked));
    assert_eq!(s.book_document(created.id).unwrap_err().status(), Some(409));

    let ledger = s.list_ledger().unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].document_id, Some(created.id));
    assert_eq!(ledger[0].cost, Some(100.0));
    assert_eq!(ledger[0].income, None);
}

#[test]
fn reports_use_server_or_fallback_filenames() {
    let (url, _state) = start_server();
    let mut s = session(&url);
    s.login("anna@saldo.pl", "secret").unwrap();

    let yearly = s.kpir_report(&KpirPeriod::Year { year: 2024 }).unwrap();
    assert_eq!(yearly.filename, "KPiR 2024.pdf");
    assert!(yearly.bytes.starts_with(b"%PDF"));

    let monthly = s.kpir_report(&KpirPeriod::Month { year: 2024, month: 3 }).unwrap();
    assert_eq!(monthly.filename, "kpir-2024-03.pdf");

    let params = ContractorReportParams {
        date_from: "2024-01-01".to_string(),
        date_to: "2024-12-31".to_string(),
        include_income: true,
        include_cost: true,
        contractor_id: None,
    };
    match s.contractors_report(&params).unwrap_err() {
        ApiError::UnexpectedJson { body } => {
            assert!(body.contains("No documents in the selected period."))
        }
        other => panic!("unexpected error: {other}"),
    }

    s.create_document(&DocumentCreate {
        doc_type: DocumentType::Income,
        number: None,
        description: None,
        issue_date: "2024-06-01".to_string(),
        contractor_id: Some(1),
        net_amount: 10.0,
        vat_amount: 2.3,
    })
    .unwrap();
    let xlsx = s.contractors_report(&params).unwrap();
    assert_eq!(xlsx.filename, "kontrahenci_2024-01-01_2024-12-31.xlsx");
    assert!(xlsx
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("spreadsheetml")));
}

#[test]
fn invalid_period_never_reaches_the_server() {
    let (url, state) = start_server();
    let mut s = session(&url);

    let err = s
        .kpir_report(&KpirPeriod::Quarter { year: 2024, quarter: 5 })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(state.csrf_requests(), 0);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut s = session(&format!("http://{addr}"));
    assert!(matches!(s.me().unwrap_err(), ApiError::Transport(_)));
}
