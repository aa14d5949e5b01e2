//! Contracts for the external systems the pipeline drives.
//!
//! Each capability is a narrow async trait so tests can swap in the
//! simulated implementations from [`crate::adapters::simulated`].

use async_trait::async_trait;

use bridge_types::{Code, ValidationError};

use crate::error::CapabilityResult;

/// Text-generation backend.
#[async_trait]
pub trait AiCapability: Send + Sync {
    /// Name of this backend for logging.
    fn name(&self) -> &str;

    /// Return the raw completion for `prompt`.
    async fn generate(&self, prompt: &str) -> CapabilityResult<String>;
}

/// One static-analysis tool.
#[async_trait]
pub trait AnalyzerCapability: Send + Sync {
    /// Identifier stamped on findings, e.g. `clippy`.
    fn tool(&self) -> &str;

    /// Run the tool over `code` and return its findings.
    async fn analyze(&self, code: &Code) -> CapabilityResult<Vec<ValidationError>>;
}

/// What a successful build leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Deployed address as written by the build tool.
    pub address: String,
}

/// Build-and-deploy toolchain.
#[async_trait]
pub trait BuildCapability: Send + Sync {
    /// Name of this toolchain for logging.
    fn name(&self) -> &str;

    async fn build(&self) -> CapabilityResult<BuildArtifact>;
}
