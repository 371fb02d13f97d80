//! In-memory stand-in for the bookkeeping backend.
//!
//! Speaks the same contract as the real service: a cookie session
//! bootstrapped by `/sanctum/csrf-cookie`, an `X-XSRF-TOKEN` check on every
//! write, and the mixed list envelopes the client has to normalize.

mod auth;
mod error;
mod reports;
mod resources;
mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

pub use error::Failure;
pub use state::{AppState, Company, Contractor, Document, LedgerRow, UserRecord};

pub const SESSION_COOKIE: &str = "ledger_session";
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

pub fn app() -> Router {
    app_with_state(AppState::seeded())
}

pub fn app_with_state(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::verify_csrf));

    let protected = Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/logout", post(auth::logout))
        .route(
            "/api/admin/companies",
            get(resources::list_companies).post(resources::create_company),
        )
        .route(
            "/api/admin/companies/{id}",
            get(resources::get_company)
                .patch(resources::update_company)
                .delete(resources::delete_company),
        )
        .route("/api/admin/companies/{id}/users", get(resources::list_company_users))
        .route(
            "/api/contractors",
            get(resources::list_contractors).post(resources::create_contractor),
        )
        .route(
            "/api/contractors/{id}",
            axum::routing::patch(resources::update_contractor).delete(resources::delete_contractor),
        )
        .route(
            "/api/documents",
            get(resources::list_documents).post(resources::create_document),
        )
        .route("/api/documents/{id}/book", post(resources::book_document))
        .route("/api/ledger", get(resources::list_ledger))
        .route("/api/reports/kpir", post(reports::kpir))
        .route("/api/reports/contractors-xlsx", post(reports::contractors_xlsx))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::verify_csrf));

    Router::new()
        .route("/sanctum/csrf-cookie", get(auth::csrf_cookie))
        .merge(public)
        .merge(protected)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::seeded()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}
