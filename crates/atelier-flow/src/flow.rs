use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Local;
use rand::Rng;
use tracing::{debug, instrument};

use atelier_core::vfs::FileSystemData;

use crate::error::FlowError;
use crate::traits::{
    AnonWorkStore, CredentialGateway, CredentialOutcome, Navigator, NewProject, ProjectGateway,
};

/// Outcome of a sign-in/sign-up call. Failure carries the credential
/// action's own error string, verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure { error: String },
}

#[derive(Clone, Copy, Debug)]
enum CredentialAction {
    SignIn,
    SignUp,
}

/// Orchestrates a credential check and, on success, decides which project
/// the user lands on: anonymous work first, then the most recent existing
/// project, then a fresh empty one.
///
/// Overlapping calls are not serialized. Both may reach reconciliation; the
/// anonymous-work clear is idempotent, so the later caller falls through to
/// the existing/new-project branches.
pub struct AuthFlow {
    credentials: Arc<dyn CredentialGateway>,
    anon_work: Arc<dyn AnonWorkStore>,
    projects: Arc<dyn ProjectGateway>,
    navigator: Arc<dyn Navigator>,
    in_flight: AtomicUsize,
}

impl AuthFlow {
    pub fn new(
        credentials: Arc<dyn CredentialGateway>,
        anon_work: Arc<dyn AnonWorkStore>,
        projects: Arc<dyn ProjectGateway>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            credentials,
            anon_work,
            projects,
            navigator,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while any sign-in/sign-up call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, FlowError> {
        self.run(CredentialAction::SignIn, email, password).await
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthOutcome, FlowError> {
        self.run(CredentialAction::SignUp, email, password).await
    }

    async fn run(
        &self,
        action: CredentialAction,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, FlowError> {
        // Guard drop resets the counter on every exit path, including `?`.
        let _loading = LoadingGuard::enter(&self.in_flight);

        let outcome = match action {
            CredentialAction::SignIn => self.credentials.sign_in(email, password).await?,
            CredentialAction::SignUp => self.credentials.sign_up(email, password).await?,
        };

        match outcome {
            CredentialOutcome::Failure { error } => Ok(AuthOutcome::Failure { error }),
            CredentialOutcome::Success => {
                self.reconcile().await?;
                Ok(AuthOutcome::Success)
            }
        }
    }

    /// The landing decision, evaluated in fixed order. Navigation only ever
    /// happens after the create/list call it depends on has resolved.
    async fn reconcile(&self) -> Result<(), FlowError> {
        if let Some(work) = self.anon_work.get().filter(|w| w.has_messages()) {
            let project = self
                .projects
                .create(NewProject {
                    name: anon_project_name(),
                    messages: work.messages,
                    data: work.file_system,
                })
                .await?;
            self.anon_work.clear();
            debug!(project_id = %project.id, "anonymous work promoted to project");
            self.navigator.push(&format!("/{}", project.id));
            return Ok(());
        }

        let existing = self.projects.list().await?;
        if let Some(landing) = existing.first() {
            self.navigator.push(&format!("/{}", landing.id));
            return Ok(());
        }

        let project = self
            .projects
            .create(NewProject {
                name: fresh_project_name(),
                messages: Vec::new(),
                data: FileSystemData::new(),
            })
            .await?;
        self.navigator.push(&format!("/{}", project.id));
        Ok(())
    }
}

/// RAII in-flight marker: `is_loading` is the OR of live guards.
struct LoadingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

fn anon_project_name() -> String {
    format!("Design from {}", Local::now().format("%-I:%M:%S %p"))
}

fn fresh_project_name() -> String {
    format!("New Design #{}", rand::thread_rng().gen_range(0..100_000))
}
