//! Error types for the orchestration pipeline and its capabilities.

use bridge_types::ContractError;
use thiserror::Error;

/// Classification of a capability failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityErrorKind {
    /// Could not reach the remote service.
    Transport,
    /// The remote service answered with an error.
    Provider,
    /// Adapter is missing credentials or settings.
    InvalidConfig,
    /// A local tool could not be started.
    Invocation,
    /// A local tool ran and exited unsuccessfully.
    NonZeroExit,
    /// A tool finished but did not leave the expected output behind.
    MissingArtifact,
    /// Output was present but malformed.
    Parse,
}

impl std::fmt::Display for CapabilityErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CapabilityErrorKind::Transport => "transport",
            CapabilityErrorKind::Provider => "provider",
            CapabilityErrorKind::InvalidConfig => "invalid_config",
            CapabilityErrorKind::Invocation => "invocation",
            CapabilityErrorKind::NonZeroExit => "non_zero_exit",
            CapabilityErrorKind::MissingArtifact => "missing_artifact",
            CapabilityErrorKind::Parse => "parse",
        };
        f.write_str(name)
    }
}

/// Failure reported by an external capability (AI, analyzer, build tool).
///
/// The message is always a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct CapabilityError {
    pub kind: CapabilityErrorKind,
    pub message: String,
}

impl CapabilityError {
    pub fn new(kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            kind,
            message: message.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Convenience result type for capability calls.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors that abort a pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Value-object validation or lifecycle misuse.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The AI capability failed.
    #[error("generation failed: {0}")]
    GenerationFailed(CapabilityError),

    /// The AI capability did not answer in time.
    #[error("generation timed out after {after_secs}s")]
    GenerationTimedOut { after_secs: u64 },

    /// A single analyzer failed. Downgraded to a critical finding by the aggregator.
    #[error("analyzer {tool} failed: {source}")]
    AnalyzerInvocationFailed {
        tool: String,
        #[source]
        source: CapabilityError,
    },

    /// The build/deploy capability failed.
    #[error("deployment failed: {0}")]
    DeploymentFailed(CapabilityError),

    /// The build/deploy capability did not finish in time.
    #[error("deployment timed out after {after_secs}s")]
    DeploymentTimedOut { after_secs: u64 },

    /// Configuration could not be loaded or wired.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
