//! Simulated capabilities for testing.
//!
//! Each one returns a configured outcome, optionally after a delay, so
//! tests can exercise success, failure and timeout paths without network
//! access or installed toolchains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use bridge_types::{Code, ValidationError};

use crate::capability::{AiCapability, AnalyzerCapability, BuildArtifact, BuildCapability};
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult};

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

// ── Simulated AI ───────────────────────────────────────────────────────

/// AI backend that returns a fixed completion and remembers every prompt.
pub struct SimulatedAi {
    outcome: CapabilityResult<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl SimulatedAi {
    pub fn responding(raw: impl Into<String>) -> Self {
        Self {
            outcome: Ok(raw.into()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            outcome: Err(CapabilityError::new(kind, message)),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AiCapability for SimulatedAi {
    fn name(&self) -> &str {
        "simulated-ai"
    }

    async fn generate(&self, prompt: &str) -> CapabilityResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        pause(self.delay).await;
        self.outcome.clone()
    }
}

// ── Simulated Analyzer ─────────────────────────────────────────────────

/// Analyzer that reports a fixed list of findings or a fixed failure.
pub struct SimulatedAnalyzer {
    tool: String,
    outcome: CapabilityResult<Vec<ValidationError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl SimulatedAnalyzer {
    /// An analyzer with no findings.
    pub fn clean(tool: impl Into<String>) -> Self {
        Self::reporting(tool, Vec::new())
    }

    pub fn reporting(tool: impl Into<String>, findings: Vec<ValidationError>) -> Self {
        Self {
            tool: tool.into(),
            outcome: Ok(findings),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            outcome: Err(CapabilityError::new(CapabilityErrorKind::Invocation, message)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `analyze` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyzerCapability for SimulatedAnalyzer {
    fn tool(&self) -> &str {
        &self.tool
    }

    async fn analyze(&self, _code: &Code) -> CapabilityResult<Vec<ValidationError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.outcome.clone()
    }
}

// ── Simulated Builder ──────────────────────────────────────────────────

/// Build toolchain that "deploys" to a fixed address.
pub struct SimulatedBuilder {
    outcome: CapabilityResult<BuildArtifact>,
    delay: Option<Duration>,
}

impl SimulatedBuilder {
    pub fn deploying_to(address: impl Into<String>) -> Self {
        Self {
            outcome: Ok(BuildArtifact {
                address: address.into(),
            }),
            delay: None,
        }
    }

    pub fn failing(kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            outcome: Err(CapabilityError::new(kind, message)),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl BuildCapability for SimulatedBuilder {
    fn name(&self) -> &str {
        "simulated-builder"
    }

    async fn build(&self) -> CapabilityResult<BuildArtifact> {
        pause(self.delay).await;
        self.outcome.clone()
    }
}
