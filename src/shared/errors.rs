#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalError {
    #[error("request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },
    #[error("{endpoint} returned http {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: String,
        reason: String,
    },
}

impl ExternalError {
    pub fn unavailable(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }
}
