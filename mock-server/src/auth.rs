use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Failure;
use crate::state::{AppState, Db, SessionRecord, UserRecord};
use crate::{SESSION_COOKIE, XSRF_COOKIE};

/// Set on requests that passed `require_user`.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub u64);

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn session<'a>(db: &'a Db, jar: &CookieJar) -> Option<&'a SessionRecord> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| db.sessions.get(c.value()))
}

fn csrf_mismatch() -> Response {
    let status = StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN);
    Failure::new(status, "CSRF token mismatch.").into_response()
}

/// Issues a fresh anti-forgery token, opening a session if needed.
pub async fn csrf_cookie(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    state.count_csrf_request();
    let token = Uuid::new_v4().simple().to_string();

    let mut db = state.db.write().await;
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| db.sessions.contains_key(id))
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    db.sessions.entry(session_id.clone()).or_default().xsrf = token.clone();
    drop(db);

    let jar = jar
        .add(Cookie::build((XSRF_COOKIE, token)).path("/"))
        .add(Cookie::build((SESSION_COOKIE, session_id)).path("/").http_only(true));
    (jar, StatusCode::NO_CONTENT)
}

/// Rejects writes whose `X-XSRF-TOKEN` does not match the session token.
pub async fn verify_csrf(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(request).await;
    }
    let header = request
        .headers()
        .get("x-xsrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let valid = {
        let db = state.db.read().await;
        match (session(&db, &jar), header) {
            (Some(s), Some(h)) => s.xsrf == h,
            _ => false,
        }
    };
    if !valid {
        tracing::debug!(method = %request.method(), uri = %request.uri(), "csrf rejected");
        return csrf_mismatch();
    }
    next.run(request).await
}

pub async fn require_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = {
        let db = state.db.read().await;
        session(&db, &jar).and_then(|s| s.user_id)
    };
    match user_id {
        Some(id) => {
            request.extensions_mut().insert(CurrentUser(id));
            next.run(request).await
        }
        None => Failure::new(StatusCode::UNAUTHORIZED, "Unauthenticated.").into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Result<Json<UserRecord>, Failure> {
    let email = input.email.trim();
    if email.is_empty() {
        return Err(Failure::invalid("email", "The email field is required."));
    }

    let mut db = state.db.write().await;
    let user = db
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == input.password)
        .cloned()
        .ok_or_else(|| Failure::invalid("email", "These credentials do not match our records."))?;

    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Session expired."))?;
    if let Some(record) = db.sessions.get_mut(&session_id) {
        record.user_id = Some(user.id);
    }
    tracing::info!(user_id = user.id, "login");
    Ok(Json(user))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(CurrentUser(id)): Extension<CurrentUser>,
) -> Result<Json<UserRecord>, Failure> {
    let db = state.db.read().await;
    db.user(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Unauthenticated."))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        state.db.write().await.sessions.remove(&id);
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}
