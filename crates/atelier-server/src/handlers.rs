use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use atelier_core::work::AnonymousWork;
use atelier_flow::{AnonWorkTracker, AuthFlow, AuthOutcome};
use atelier_store::projects::ProjectRepo;
use atelier_store::users::UserRepo;

use crate::gateways::{AuthenticatedUser, RedirectSink, StoreCredentials, StoreProjects};
use crate::jar::HttpJar;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
    /// Pre-authentication work the client accumulated locally, if any.
    #[serde(default)]
    pub anon_work: Option<AnonymousWork>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Clone, Copy)]
enum CredentialKind {
    SignIn,
    SignUp,
}

pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AuthRequest>,
) -> Response {
    run_auth(state, headers, req, CredentialKind::SignIn).await
}

pub async fn sign_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AuthRequest>,
) -> Response {
    run_auth(state, headers, req, CredentialKind::SignUp).await
}

/// Wire one authentication attempt: jar and collaborator adapters live for
/// exactly this request, the flow runs, and its navigation lands in the
/// response as a redirect path.
async fn run_auth(
    state: AppState,
    headers: HeaderMap,
    req: AuthRequest,
    kind: CredentialKind,
) -> Response {
    let jar = Arc::new(HttpJar::from_headers(&headers));
    let identity = AuthenticatedUser::new();
    let anon_work = Arc::new(AnonWorkTracker::seeded(req.anon_work));
    let navigator = RedirectSink::new();

    let credentials = Arc::new(StoreCredentials::new(
        UserRepo::new(state.db.clone()),
        state.sessions.clone(),
        jar.clone(),
        identity.clone(),
    ));
    let projects = Arc::new(StoreProjects::new(
        ProjectRepo::new(state.db.clone()),
        identity,
    ));
    let flow = AuthFlow::new(credentials, anon_work, projects, navigator.clone());

    let result = match kind {
        CredentialKind::SignIn => flow.sign_in(&req.email, &req.password).await,
        CredentialKind::SignUp => flow.sign_up(&req.email, &req.password).await,
    };

    match result {
        Ok(AuthOutcome::Success) => {
            let body = AuthResponse {
                success: true,
                error: None,
                redirect: navigator.take(),
            };
            (StatusCode::OK, set_cookie_headers(&jar), Json(body)).into_response()
        }
        Ok(AuthOutcome::Failure { error }) => {
            let body = AuthResponse {
                success: false,
                error: Some(error),
                redirect: None,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(kind = e.kind(), "authentication flow failed: {e}");
            let body = AuthResponse {
                success: false,
                error: Some(e.to_string()),
                redirect: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Current session introspection. Absent, expired, and forged tokens are all
/// the same 401.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let jar = HttpJar::from_headers(&headers);
    match state.sessions.session(&jar) {
        Some(session) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "user_id": session.user_id,
                "email": session.email,
                "expires_at": session.expires_at.to_rfc3339(),
            })),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "unauthorized" })),
        )
            .into_response(),
    }
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let jar = HttpJar::from_headers(&headers);
    state.sessions.delete_session(&jar);
    (
        StatusCode::OK,
        set_cookie_headers(&jar),
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    let db_ok = state
        .db
        .with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(Into::into)
        })
        .is_ok();

    if db_ok {
        (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unhealthy" })),
        )
            .into_response()
    }
}

fn set_cookie_headers(jar: &HttpJar) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in jar.set_cookie_headers() {
        headers.append("set-cookie", value);
    }
    headers
}
