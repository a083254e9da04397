use thiserror::Error;

/// Why a plan request produced no plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// One or more required form fields were empty. Never reaches the network.
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// The endpoint was unreachable or answered with a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered, but not with the JSON object we asked for.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl PlanError {
    /// Short machine-friendly name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Message shown to the user in the form's error slot.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Please fill in all fields.",
            Self::Network(_) | Self::MalformedResponse(_) => {
                "Failed to generate plan. Please try again."
            }
        }
    }
}
