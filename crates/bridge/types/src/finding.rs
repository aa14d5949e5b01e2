//! Static-analysis findings and the merged analysis result.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Error and Critical findings stop a contract from being analyzed.
    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            other => Err(ContractError::InvalidSeverity(other.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, ContractError> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Identifier of the analyzer that produced the finding.
    pub tool: String,
    pub error_code: String,
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(
        tool: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
        line: u32,
        severity: Severity,
    ) -> Self {
        Self {
            tool: tool.into(),
            error_code: error_code.into(),
            message: message.into(),
            line,
            severity,
        }
    }

    /// Build from raw tool output, validating the severity name.
    pub fn parse(
        tool: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
        line: u32,
        severity: &str,
    ) -> Result<Self, ContractError> {
        Ok(Self::new(tool, error_code, message, line, severity.parse()?))
    }

    /// One-line form stored on a failed contract.
    pub fn describe(&self) -> String {
        format!(
            "[{}:{}] {} at line {}: {}",
            self.tool, self.severity, self.error_code, self.line, self.message
        )
    }
}

/// Merged output of every analyzer run over one piece of code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_success: bool,
    pub errors: Vec<ValidationError>,
}

impl AnalysisResult {
    pub fn clean() -> Self {
        Self {
            is_success: true,
            errors: Vec::new(),
        }
    }

    pub fn blocking_count(&self) -> usize {
        self.errors.iter().filter(|e| e.severity.is_blocking()).count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ValidationError::describe).collect()
    }
}
