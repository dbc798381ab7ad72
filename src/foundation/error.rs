/// Convenience result alias used across the crate.
pub type RevealResult<T> = Result<T, RevealError>;

/// Top-level error type for configuration, scheduling, and scenario handling.
///
/// Runtime choreography never produces these: a rejected autoplay, a missing media surface,
/// or an unsupported visibility observer are states, not errors.
#[derive(thiserror::Error, Debug)]
pub enum RevealError {
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid timer or clock usage.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Malformed scripted scenario.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure propagated from external libraries.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RevealError {
    /// Build a [`RevealError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`RevealError::Schedule`] value.
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`RevealError::Scenario`] value.
    pub fn scenario(msg: impl Into<String>) -> Self {
        Self::Scenario(msg.into())
    }

    /// Build a [`RevealError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for RevealError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
