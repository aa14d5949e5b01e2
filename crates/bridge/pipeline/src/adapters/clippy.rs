//! Lint analyzer backed by `cargo clippy`.
//!
//! The code is dropped into a throwaway cargo project as `src/lib.rs` and
//! checked with warnings denied.

use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument};

use bridge_types::{Code, Severity, ValidationError};

use super::{run_tool, stderr_summary};
use crate::capability::AnalyzerCapability;
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult};

pub const TOOL: &str = "clippy";
pub const ERROR_CODE: &str = "CLIPPY_ERR";

const MANIFEST: &str = r#"[package]
name = "bridge_contract_check"
version = "0.1.0"
edition = "2021"

[lib]
path = "src/lib.rs"

[dependencies]
anchor-lang = "0.28.0"
"#;

fn diagnostic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"error(?:\[[A-Za-z0-9_:]+\])?: (.*)\n\s*--> .*?:(\d+):\d+")
            .expect("clippy diagnostic pattern is valid")
    })
}

/// Extract `error:` diagnostics with their line numbers.
pub fn parse_clippy_output(output: &str) -> Vec<ValidationError> {
    diagnostic_pattern()
        .captures_iter(output)
        .filter_map(|caps| {
            let line = caps[2].parse().ok()?;
            Some(ValidationError::new(
                TOOL,
                ERROR_CODE,
                caps[1].trim(),
                line,
                Severity::Error,
            ))
        })
        .collect()
}

/// Runs `cargo clippy --all-targets -- -D warnings` over the code.
#[derive(Debug, Clone, Default)]
pub struct ClippyAnalyzer;

impl ClippyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    async fn write_project(root: &Path, code: &Code) -> CapabilityResult<()> {
        let io_err = |e: std::io::Error| {
            CapabilityError::new(
                CapabilityErrorKind::Invocation,
                format!("cannot prepare clippy project: {e}"),
            )
        };
        tokio::fs::create_dir_all(root.join("src")).await.map_err(io_err)?;
        tokio::fs::write(root.join("Cargo.toml"), MANIFEST).await.map_err(io_err)?;
        tokio::fs::write(root.join("src/lib.rs"), code.as_str()).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl AnalyzerCapability for ClippyAnalyzer {
    fn tool(&self) -> &str {
        TOOL
    }

    #[instrument(skip(self, code))]
    async fn analyze(&self, code: &Code) -> CapabilityResult<Vec<ValidationError>> {
        let dir = tempfile::tempdir().map_err(|e| {
            CapabilityError::new(CapabilityErrorKind::Invocation, format!("tempdir: {e}"))
        })?;
        Self::write_project(dir.path(), code).await?;

        let mut command = Command::new("cargo");
        command
            .args(["clippy", "--all-targets", "--", "-D", "warnings"])
            .current_dir(dir.path());
        let output = run_tool(command).await?;

        if output.status.success() {
            return Ok(Vec::new());
        }

        let findings = parse_clippy_output(&String::from_utf8_lossy(&output.stderr));
        debug!(findings = findings.len(), status = %output.status, "clippy finished");
        if findings.is_empty() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::NonZeroExit,
                format!("cargo clippy exited with {}: {}", output.status, stderr_summary(&output)),
            ));
        }
        Ok(findings)
    }
}
