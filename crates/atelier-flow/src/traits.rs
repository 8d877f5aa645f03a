use async_trait::async_trait;

use atelier_core::ids::ProjectId;
use atelier_core::messages::ChatMessage;
use atelier_core::vfs::FileSystemData;
use atelier_core::work::AnonymousWork;

use crate::error::FlowError;

/// Result of a credential action: success, or a user-facing failure string
/// produced by the action itself. The flow never constructs its own failure
/// strings; it passes these through unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialOutcome {
    Success,
    Failure { error: String },
}

/// The external sign-in/sign-up actions. A successful call has already
/// established the session token on the server side; the flow only learns
/// success or failure.
#[async_trait]
pub trait CredentialGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str)
        -> Result<CredentialOutcome, FlowError>;
    async fn sign_up(&self, email: &str, password: &str)
        -> Result<CredentialOutcome, FlowError>;
}

/// Ephemeral pre-authentication work. `clear` on an empty store is a no-op;
/// that idempotence is what makes the double-submit race tolerable.
pub trait AnonWorkStore: Send + Sync {
    fn get(&self) -> Option<AnonymousWork>;
    fn clear(&self);
}

/// The slice of a project the landing decision needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a project created during reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub data: FileSystemData,
}

/// The authenticated user's durable projects. `list` returns entries
/// pre-ordered: the first one is the intended landing target, and the flow
/// does not re-sort.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<ProjectSummary>, FlowError>;
    async fn create(&self, project: NewProject) -> Result<ProjectSummary, FlowError>;
}

/// Fire-and-forget navigation; never awaited, never fails.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}
