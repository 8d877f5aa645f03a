/// Transport-level failures surfaced by collaborators. Credential rejections
/// are not errors: they travel as `AuthOutcome::Failure` values.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("credential action failed: {0}")]
    Credential(String),

    #[error("project store failed: {0}")]
    Projects(String),
}

impl FlowError {
    /// Short classification string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "credential",
            Self::Projects(_) => "projects",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings() {
        assert_eq!(FlowError::Credential("boom".into()).kind(), "credential");
        assert_eq!(FlowError::Projects("boom".into()).kind(), "projects");
    }

    #[test]
    fn display_includes_detail() {
        let err = FlowError::Credential("connection refused".into());
        assert_eq!(err.to_string(), "credential action failed: connection refused");
    }
}
