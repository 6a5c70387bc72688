//! Error types for the LogHub core.

/// Core error type for LogHub provisioning.
#[derive(Debug, thiserror::Error)]
pub enum LogHubError {
    /// Required input missing or empty, detected before any resource is declared.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Derived bucket name violates S3 naming rules.
    #[error("invalid bucket name: {name} ({reason})")]
    InvalidBucketName {
        /// The offending bucket name.
        name: String,
        /// Which naming rule was violated.
        reason: String,
    },

    /// Two resources were declared under the same logical ID.
    #[error("duplicate logical ID: {0}")]
    DuplicateLogicalId(String),

    /// A resource references another that has not been declared.
    #[error("resource {resource} depends on {depends_on}, which is not declared")]
    DependencyNotReady {
        /// The logical ID of the referencing resource.
        resource: String,
        /// The logical ID it depends on.
        depends_on: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle involving {0}")]
    CycleDetected(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for LogHub operations.
pub type LogHubResult<T> = Result<T, LogHubError>;
