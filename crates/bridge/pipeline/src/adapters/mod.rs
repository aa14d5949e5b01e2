//! Capability adapters.
//!
//! - [`openai`]: chat-completions client implementing [`AiCapability`]
//! - [`clippy`] / [`prusti`]: local analyzers implementing [`AnalyzerCapability`]
//! - [`anchor`]: `anchor build` toolchain implementing [`BuildCapability`]
//! - [`simulated`]: configurable stand-ins for tests
//!
//! [`AiCapability`]: crate::capability::AiCapability
//! [`AnalyzerCapability`]: crate::capability::AnalyzerCapability
//! [`BuildCapability`]: crate::capability::BuildCapability

use std::process::Output;
use std::sync::Arc;

use tokio::process::Command;
use tracing::debug;

use crate::capability::AnalyzerCapability;
use crate::config::AnalysisConfig;
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult, PipelineError, PipelineResult};

pub mod anchor;
pub mod clippy;
pub mod openai;
pub mod prusti;
pub mod simulated;

pub use anchor::AnchorBuilder;
pub use clippy::ClippyAnalyzer;
pub use openai::OpenAiClient;
pub use prusti::PrustiAnalyzer;
pub use simulated::{SimulatedAi, SimulatedAnalyzer, SimulatedBuilder};

const SUMMARY_MAX: usize = 200;

/// Instantiate the configured analyzers, preserving their order.
pub fn build_analyzers(config: &AnalysisConfig) -> PipelineResult<Vec<Arc<dyn AnalyzerCapability>>> {
    config
        .analyzers
        .iter()
        .map(|name| -> PipelineResult<Arc<dyn AnalyzerCapability>> {
            match name.as_str() {
                clippy::TOOL => Ok(Arc::new(ClippyAnalyzer::new())),
                prusti::TOOL => Ok(Arc::new(PrustiAnalyzer::new())),
                other => Err(PipelineError::Config(format!("unknown analyzer: {other}"))),
            }
        })
        .collect()
}

/// Run a local tool to completion. The child is killed if the future is dropped.
pub(crate) async fn run_tool(mut command: Command) -> CapabilityResult<Output> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    debug!(program = %program, "Spawning tool");
    command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            CapabilityError::new(
                CapabilityErrorKind::Invocation,
                format!("failed to run {program}: {e}"),
            )
        })
}

/// The most telling line of a tool's stderr, on one line.
pub(crate) fn stderr_summary(output: &Output) -> String {
    summarize(&String::from_utf8_lossy(&output.stderr))
}

/// Reduce multi-line tool or service output to a single capped line.
///
/// The first line starting with `error` wins, otherwise the first non-empty
/// line. Runs of whitespace collapse to one space.
pub(crate) fn summarize(text: &str) -> String {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let chosen = text
        .lines()
        .map(str::trim)
        .find(|line| line.to_ascii_lowercase().starts_with("error"))
        .or_else(|| lines.next());
    let Some(line) = chosen else {
        return "no output".to_string();
    };
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(SUMMARY_MAX) {
        Some((idx, _)) => format!("{}...", &collapsed[..idx]),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_analyzers_keeps_order() {
        let config = AnalysisConfig {
            analyzers: vec!["prusti".into(), "clippy".into()],
            ..AnalysisConfig::default()
        };
        let analyzers = build_analyzers(&config).unwrap();
        let tools: Vec<&str> = analyzers.iter().map(|a| a.tool()).collect();
        assert_eq!(tools, vec!["prusti", "clippy"]);
    }

    #[test]
    fn build_analyzers_rejects_unknown() {
        let config = AnalysisConfig {
            analyzers: vec!["clippy".into(), "semgrep".into()],
            ..AnalysisConfig::default()
        };
        match build_analyzers(&config) {
            Err(PipelineError::Config(msg)) => assert_eq!(msg, "unknown analyzer: semgrep"),
            Err(other) => panic!("expected Config error, got {other:?}"),
            Ok(_) => panic!("expected Config error"),
        }
    }

    const STACK_TRACE: &str = "Exception in thread \"main\" java.lang.NullPointerException\n\
        \tat viper.silicon.Verifier.verify(Verifier.scala:42)\n\
        \tat viper.silicon.Main.main(Main.scala:7)\n";

    #[test]
    fn summary_keeps_first_line_of_stack_trace() {
        assert_eq!(
            summarize(STACK_TRACE),
            "Exception in thread \"main\" java.lang.NullPointerException"
        );
    }

    #[test]
    fn summary_prefers_error_line() {
        let stderr = "   Compiling anchor-lang v0.28.0\nerror: linker `cc` not found\n  |\n  = note: No such file\n";
        assert_eq!(summarize(stderr), "error: linker `cc` not found");
    }

    #[test]
    fn summary_is_capped_and_collapsed() {
        let long = format!("error:   {}", "x ".repeat(500));
        let summary = summarize(&long);
        assert!(!summary.contains('\n'));
        assert!(!summary.contains("  "));
        assert_eq!(summary.chars().count(), SUMMARY_MAX + 3);
        assert_eq!(summarize("\n  \n"), "no output");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_reports_single_line() {
        let mut command = Command::new("sh");
        command.arg("-c").arg(format!("printf '{}' >&2; exit 101", STACK_TRACE.replace('"', "")));
        let output = run_tool(command).await.unwrap();
        assert!(!output.status.success());

        let err = CapabilityError::new(
            CapabilityErrorKind::NonZeroExit,
            format!("prusti-rustc exited with {}: {}", output.status, stderr_summary(&output)),
        );
        assert!(!err.message.contains('\n'));
        assert!(err.message.ends_with("java.lang.NullPointerException"));
    }

    #[tokio::test]
    async fn missing_tool_is_invocation_error() {
        let err = run_tool(Command::new("contract-bridge-no-such-tool"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, CapabilityErrorKind::Invocation);
        assert!(err.message.contains("contract-bridge-no-such-tool"));
    }
}
