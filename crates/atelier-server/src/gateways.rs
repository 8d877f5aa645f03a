use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::instrument;

use atelier_auth::{CookieStore, SessionManager};
use atelier_core::ids::UserId;
use atelier_flow::{
    CredentialGateway, CredentialOutcome, FlowError, Navigator, NewProject, ProjectGateway,
    ProjectSummary,
};
use atelier_store::projects::{ProjectRepo, ProjectRow};
use atelier_store::users::{UserRepo, UserRow};
use atelier_store::StoreError;

/// User-facing failure strings. These originate here, in the credential
/// action; the flow passes them through untouched.
const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already registered";

/// Identity established by the credential action for one authentication
/// attempt, shared with the project gateway of the same attempt.
#[derive(Default)]
pub struct AuthenticatedUser {
    slot: Mutex<Option<UserId>>,
}

impl AuthenticatedUser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn establish(&self, user_id: UserId) {
        *self.slot.lock() = Some(user_id);
    }

    fn get(&self) -> Option<UserId> {
        self.slot.lock().clone()
    }
}

/// CredentialGateway backed by the user store. On success it issues the
/// session cookie into the jar before the flow ever resumes, so the token
/// exists server-side by the time reconciliation runs.
pub struct StoreCredentials {
    users: UserRepo,
    sessions: Arc<SessionManager>,
    jar: Arc<dyn CookieStore>,
    identity: Arc<AuthenticatedUser>,
}

impl StoreCredentials {
    pub fn new(
        users: UserRepo,
        sessions: Arc<SessionManager>,
        jar: Arc<dyn CookieStore>,
        identity: Arc<AuthenticatedUser>,
    ) -> Self {
        Self {
            users,
            sessions,
            jar,
            identity,
        }
    }

    fn open_session(&self, user: UserRow) -> Result<CredentialOutcome, FlowError> {
        self.sessions
            .create_session(self.jar.as_ref(), &user.id, &user.email)
            .map_err(|e| FlowError::Credential(e.to_string()))?;
        self.identity.establish(user.id);
        Ok(CredentialOutcome::Success)
    }
}

#[async_trait]
impl CredentialGateway for StoreCredentials {
    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialOutcome, FlowError> {
        match self.users.verify_credentials(email, password) {
            Ok(Some(user)) => self.open_session(user),
            Ok(None) => Ok(CredentialOutcome::Failure {
                error: INVALID_CREDENTIALS.into(),
            }),
            Err(e) => Err(FlowError::Credential(e.to_string())),
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialOutcome, FlowError> {
        match self.users.create(email, password) {
            Ok(user) => self.open_session(user),
            Err(StoreError::Conflict(_)) => Ok(CredentialOutcome::Failure {
                error: EMAIL_TAKEN.into(),
            }),
            Err(e) => Err(FlowError::Credential(e.to_string())),
        }
    }
}

/// ProjectGateway scoped to whichever user the credential action
/// established.
pub struct StoreProjects {
    projects: ProjectRepo,
    identity: Arc<AuthenticatedUser>,
}

impl StoreProjects {
    pub fn new(projects: ProjectRepo, identity: Arc<AuthenticatedUser>) -> Self {
        Self { projects, identity }
    }

    fn user_id(&self) -> Result<UserId, FlowError> {
        self.identity
            .get()
            .ok_or_else(|| FlowError::Projects("no authenticated user".into()))
    }
}

#[async_trait]
impl ProjectGateway for StoreProjects {
    async fn list(&self) -> Result<Vec<ProjectSummary>, FlowError> {
        let user_id = self.user_id()?;
        let rows = self
            .projects
            .list_for_user(&user_id)
            .map_err(|e| FlowError::Projects(e.to_string()))?;
        Ok(rows.into_iter().map(summarize).collect())
    }

    async fn create(&self, project: NewProject) -> Result<ProjectSummary, FlowError> {
        let user_id = self.user_id()?;
        let row = self
            .projects
            .create(&user_id, &project.name, &project.messages, &project.data)
            .map_err(|e| FlowError::Projects(e.to_string()))?;
        Ok(summarize(row))
    }
}

fn summarize(row: ProjectRow) -> ProjectSummary {
    ProjectSummary {
        id: row.id,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Navigator that records the chosen landing path; the HTTP handler returns
/// it as the response's redirect target.
#[derive(Default)]
pub struct RedirectSink {
    path: Mutex<Option<String>>,
}

impl RedirectSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Option<String> {
        self.path.lock().take()
    }
}

impl Navigator for RedirectSink {
    fn push(&self, path: &str) {
        *self.path.lock() = Some(path.to_string());
    }
}
