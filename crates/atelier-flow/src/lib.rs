pub mod error;
pub mod flow;
pub mod tracker;
pub mod traits;

pub use error::FlowError;
pub use flow::{AuthFlow, AuthOutcome};
pub use tracker::AnonWorkTracker;
pub use traits::{
    AnonWorkStore, CredentialGateway, CredentialOutcome, Navigator, NewProject, ProjectGateway,
    ProjectSummary,
};
