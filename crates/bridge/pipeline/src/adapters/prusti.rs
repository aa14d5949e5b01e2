//! Formal-verification analyzer backed by `prusti-rustc`.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use bridge_types::{Code, ValidationError};

use super::{run_tool, stderr_summary};
use crate::capability::AnalyzerCapability;
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult};

pub const TOOL: &str = "prusti";
pub const ERROR_CODE: &str = "PRUSTI_ERR";

fn report_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[Prusti\] (Error|Warning): (.*) at line (\d+)")
            .expect("prusti report pattern is valid")
    })
}

/// Extract `[Prusti] Error|Warning: ... at line N` reports.
pub fn parse_prusti_output(output: &str) -> Vec<ValidationError> {
    report_pattern()
        .captures_iter(output)
        .filter_map(|caps| {
            let line = caps[3].parse().ok()?;
            let severity = caps[1].to_lowercase();
            match ValidationError::parse(TOOL, ERROR_CODE, caps[2].trim(), line, &severity) {
                Ok(finding) => Some(finding),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable prusti report");
                    None
                }
            }
        })
        .collect()
}

/// Runs `prusti-rustc --edition=2021` over the code.
#[derive(Debug, Clone, Default)]
pub struct PrustiAnalyzer;

impl PrustiAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalyzerCapability for PrustiAnalyzer {
    fn tool(&self) -> &str {
        TOOL
    }

    #[instrument(skip(self, code))]
    async fn analyze(&self, code: &Code) -> CapabilityResult<Vec<ValidationError>> {
        let dir = tempfile::tempdir().map_err(|e| {
            CapabilityError::new(CapabilityErrorKind::Invocation, format!("tempdir: {e}"))
        })?;
        let source = dir.path().join("lib.rs");
        tokio::fs::write(&source, code.as_str()).await.map_err(|e| {
            CapabilityError::new(CapabilityErrorKind::Invocation, format!("write source: {e}"))
        })?;

        let mut command = Command::new("prusti-rustc");
        command
            .arg("--edition=2021")
            .arg("--crate-type=lib")
            .arg(&source)
            .current_dir(dir.path());
        let output = run_tool(command).await?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let findings = parse_prusti_output(&text);
        debug!(findings = findings.len(), status = %output.status, "prusti finished");

        if !output.status.success() && findings.is_empty() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::NonZeroExit,
                format!("prusti-rustc exited with {}: {}", output.status, stderr_summary(&output)),
            ));
        }
        Ok(findings)
    }
}
