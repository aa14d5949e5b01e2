//! # bridge-pipeline
//!
//! Orchestrates the life of a Solana contract from prompt to deployment.
//!
//! ```text
//!   CodeParams
//!       │
//!       ▼
//!  PromptBuilder ──▶ Generator ──(AiCapability)──▶ Contract(Generated)
//!                                                      │
//!                                                      ▼
//!                  AnalysisAggregator ──(AnalyzerCapability × n)──▶ Analyzed | Failed
//!                                                      │
//!                                                      ▼
//!                      Deployer ──(BuildCapability)──▶ ProgramId + rebound Code
//! ```
//!
//! Every external system sits behind a trait in [`capability`]; real
//! adapters and simulated stand-ins live in [`adapters`].

#![deny(unsafe_code)]

pub mod adapters;
pub mod analysis;
pub mod capability;
pub mod config;
pub mod deployment;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod prompt;

pub use analysis::{AnalysisAggregator, ANALYZER_FAILED, ANALYZER_TIMEOUT};
pub use capability::{AiCapability, AnalyzerCapability, BuildArtifact, BuildCapability};
pub use config::{AiConfig, AnalysisConfig, BridgeConfig, DeployConfig, LoggingConfig};
pub use deployment::Deployer;
pub use error::{CapabilityError, CapabilityErrorKind, CapabilityResult, PipelineError, PipelineResult};
pub use generation::Generator;
pub use pipeline::{ContractPipeline, PipelineRun};
pub use prompt::{PromptBuilder, PLACEHOLDER_LEN};
