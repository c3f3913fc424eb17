//! Error types for the decision service client.
//!
//! Only misconfiguration surfaces as an error. Transient failures of the
//! external service -- timeouts, bad responses, unreachable endpoints --
//! are values ([`UnavailableReason`](crate::service::UnavailableReason)),
//! because callers must degrade to "no decision", never crash.

/// Errors that can occur while constructing or configuring the service.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// Failed to render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
}
