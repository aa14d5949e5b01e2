//! Analysis aggregator and heuristic auto-fix.
//!
//! ```text
//! Code ──┬─▶ analyzer[0] ──┐
//!        ├─▶ analyzer[1] ──┼─▶ merge in registration order ─▶ AnalysisResult
//!        └─▶ analyzer[n] ──┘
//! ```
//!
//! Analyzers run concurrently. A failed or timed-out analyzer contributes a
//! single critical finding instead of aborting the whole analysis.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use bridge_types::{
    AnalysisResult, Code, Contract, ContractError, Severity, StatusType, ValidationError,
};

use crate::capability::AnalyzerCapability;
use crate::error::{PipelineError, PipelineResult};

pub const ANALYZER_FAILED: &str = "ANALYZER_FAILED";
pub const ANALYZER_TIMEOUT: &str = "ANALYZER_TIMEOUT";

const AUTO_FIX_HEADER: &str = "\n\n// Auto-fixes:\n";

/// Runs the registered analyzers and merges their findings.
pub struct AnalysisAggregator {
    analyzers: Vec<Arc<dyn AnalyzerCapability>>,
    timeout: Duration,
    warnings_block: bool,
}

impl AnalysisAggregator {
    pub fn new(analyzers: Vec<Arc<dyn AnalyzerCapability>>, timeout: Duration) -> Self {
        Self {
            analyzers,
            timeout,
            warnings_block: false,
        }
    }

    /// Fail analysis on any finding, warnings included.
    pub fn with_warnings_blocking(mut self, warnings_block: bool) -> Self {
        self.warnings_block = warnings_block;
        self
    }

    /// Registered analyzer identifiers, in merge order.
    pub fn tools(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.tool()).collect()
    }

    #[instrument(skip(self, code), fields(analyzers = self.analyzers.len()))]
    pub async fn analyze(&self, code: &Code) -> AnalysisResult {
        let runs = self
            .analyzers
            .iter()
            .map(|analyzer| self.run_one(analyzer.as_ref(), code));

        // join_all yields in input order regardless of completion order.
        let errors: Vec<ValidationError> = join_all(runs).await.into_iter().flatten().collect();

        let is_success = if self.warnings_block {
            errors.is_empty()
        } else {
            !errors.iter().any(|e| e.severity.is_blocking())
        };

        info!(findings = errors.len(), is_success, "Analysis finished");
        AnalysisResult { is_success, errors }
    }

    /// Analyze the contract's code and record the outcome on it.
    ///
    /// Only generated contracts are accepted; anything else is rejected
    /// before any analyzer runs.
    pub async fn analyze_contract(&self, contract: &mut Contract) -> PipelineResult<AnalysisResult> {
        let misuse = ContractError::InvalidTransition {
            from: contract.status_type(),
            to: StatusType::Analyzed,
        };
        if contract.status_type() != StatusType::Generated {
            return Err(misuse.into());
        }
        let code = contract.code().cloned().ok_or(misuse)?;
        let result = self.analyze(&code).await;
        contract.record_analysis(&result)?;
        Ok(result)
    }

    /// Append a fix-summary block for every finding a known fixer handles.
    ///
    /// The original source is kept as is and nothing is re-analyzed.
    pub fn auto_fix(&self, code: &Code, errors: &[ValidationError]) -> Code {
        let fixes: Vec<String> = errors.iter().filter_map(fix_note).collect();
        code.append(&format!("{AUTO_FIX_HEADER}{}", fixes.join("\n")))
    }

    async fn run_one(&self, analyzer: &dyn AnalyzerCapability, code: &Code) -> Vec<ValidationError> {
        let tool = analyzer.tool().to_string();
        debug!(tool = %tool, "Running analyzer");

        match tokio::time::timeout(self.timeout, analyzer.analyze(code)).await {
            Ok(Ok(findings)) => findings,
            Ok(Err(source)) => {
                let err = PipelineError::AnalyzerInvocationFailed {
                    tool: tool.clone(),
                    source,
                };
                warn!(tool = %tool, error = %err, "Analyzer failed, recording critical finding");
                vec![synthetic(&tool, ANALYZER_FAILED, err.to_string())]
            }
            Err(_) => {
                let secs = self.timeout.as_secs();
                warn!(tool = %tool, timeout_secs = secs, "Analyzer timed out, recording critical finding");
                vec![synthetic(
                    &tool,
                    ANALYZER_TIMEOUT,
                    format!("analyzer {tool} timed out after {secs}s"),
                )]
            }
        }
    }
}

fn synthetic(tool: &str, code: &str, message: String) -> ValidationError {
    ValidationError::new(tool, code, message, 1, Severity::Critical)
}

fn fix_note(error: &ValidationError) -> Option<String> {
    match error.tool.as_str() {
        "clippy" => Some(format!(
            "// FIX: {}\n// Original line {}",
            error.message, error.line
        )),
        "prusti" => Some(format!("// PRUSTI FIX: {}", error.message)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::simulated::SimulatedAnalyzer;
    use bridge_types::{CodeParams, Network};

    fn code() -> Code {
        Code::new("use anchor_lang::prelude::*;\npub mod mytoken {}").unwrap()
    }

    fn finding(tool: &str, message: &str, line: u32, severity: Severity) -> ValidationError {
        ValidationError::new(tool, format!("{}_ERR", tool.to_uppercase()), message, line, severity)
    }

    fn aggregator(analyzers: Vec<Arc<dyn AnalyzerCapability>>) -> AnalysisAggregator {
        AnalysisAggregator::new(analyzers, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn clean_analyzers_succeed() {
        let agg = aggregator(vec![
            Arc::new(SimulatedAnalyzer::clean("clippy")),
            Arc::new(SimulatedAnalyzer::clean("prusti")),
        ]);
        let result = agg.analyze(&code()).await;
        assert!(result.is_success);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn one_error_fails_analysis() {
        let err = finding("clippy", "unused variable", 4, Severity::Error);
        let agg = aggregator(vec![
            Arc::new(SimulatedAnalyzer::clean("prusti")),
            Arc::new(SimulatedAnalyzer::reporting("clippy", vec![err.clone()])),
        ]);
        let result = agg.analyze(&code()).await;
        assert!(!result.is_success);
        assert_eq!(result.errors, vec![err]);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_follows_registration_order() {
        // The first analyzer finishes last; its findings still come first.
        let a = vec![
            finding("clippy", "a1", 1, Severity::Warning),
            finding("clippy", "a2", 2, Severity::Error),
        ];
        let b = vec![finding("prusti", "b1", 3, Severity::Warning)];
        let agg = aggregator(vec![
            Arc::new(SimulatedAnalyzer::reporting("clippy", a).with_delay(Duration::from_secs(3))),
            Arc::new(SimulatedAnalyzer::reporting("prusti", b)),
        ]);
        let result = agg.analyze(&code()).await;
        let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn warnings_alone_do_not_block_by_default() {
        let warn = finding("prusti", "loop invariant may not hold", 7, Severity::Warning);
        let analyzers: Vec<Arc<dyn AnalyzerCapability>> =
            vec![Arc::new(SimulatedAnalyzer::reporting("prusti", vec![warn]))];

        let lenient = aggregator(analyzers.clone()).analyze(&code()).await;
        assert!(lenient.is_success);
        assert_eq!(lenient.errors.len(), 1);

        let strict = aggregator(analyzers)
            .with_warnings_blocking(true)
            .analyze(&code())
            .await;
        assert!(!strict.is_success);
    }

    #[tokio::test]
    async fn analyzer_failure_becomes_critical_finding() {
        let agg = aggregator(vec![
            Arc::new(SimulatedAnalyzer::failing("clippy", "cargo not found")),
            Arc::new(SimulatedAnalyzer::clean("prusti")),
        ]);
        let result = agg.analyze(&code()).await;
        assert!(!result.is_success);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.tool, "clippy");
        assert_eq!(err.severity, Severity::Critical);
        assert_eq!(err.error_code, ANALYZER_FAILED);
        assert!(err.message.contains("cargo not found"));
    }

    #[tokio::test]
    async fn analyzer_failure_finding_is_one_line() {
        let trace = "Exception in thread \"main\" java.lang.NullPointerException\n\
                     \tat viper.silicon.Verifier.verify(Verifier.scala:42)\n";
        let agg = aggregator(vec![Arc::new(SimulatedAnalyzer::failing("prusti", trace))]);
        let result = agg.analyze(&code()).await;
        let message = &result.errors[0].message;
        assert!(!message.contains('\n'));
        assert!(message.starts_with("analyzer prusti failed: invocation: Exception in thread"));
    }

    #[tokio::test(start_paused = true)]
    async fn analyzer_timeout_is_distinct() {
        let agg = AnalysisAggregator::new(
            vec![
                Arc::new(SimulatedAnalyzer::clean("clippy")),
                Arc::new(SimulatedAnalyzer::clean("prusti").with_delay(Duration::from_secs(60))),
            ],
            Duration::from_secs(10),
        );
        let result = agg.analyze(&code()).await;
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].tool, "prusti");
        assert_eq!(result.errors[0].error_code, ANALYZER_TIMEOUT);
        assert_eq!(result.errors[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn analyze_contract_records_outcome() {
        let mut contract = Contract::create_new(CodeParams::new("token", "MyToken", None, Network::Testnet));
        let agg = aggregator(vec![Arc::new(SimulatedAnalyzer::clean("clippy"))]);

        // Pending contracts have no code yet.
        assert!(agg.analyze_contract(&mut contract).await.is_err());

        contract.update_code(code()).unwrap();
        let result = agg.analyze_contract(&mut contract).await.unwrap();
        assert!(result.is_success);
        assert_eq!(contract.status_type(), StatusType::Analyzed);
    }

    #[tokio::test]
    async fn analyze_contract_rejects_non_generated_before_running_tools() {
        let params = CodeParams::new("token", "MyToken", None, Network::Testnet);
        let program_id = bridge_types::ProgramId::new("11111111111111111111111111111111").unwrap();

        let mut failed = Contract::create_new(params.clone());
        failed.update_code(code()).unwrap();
        failed.mark_failed("generation aborted").unwrap();

        let mut analyzed = Contract::create_new(params.clone());
        analyzed.update_code(code()).unwrap();
        analyzed.record_analysis(&AnalysisResult::clean()).unwrap();

        let mut deployed = analyzed.clone();
        deployed.record_deployment(program_id).unwrap();

        for mut contract in [failed, analyzed, deployed] {
            let analyzer = Arc::new(SimulatedAnalyzer::clean("clippy"));
            let agg = aggregator(vec![analyzer.clone()]);
            let before = contract.status_type();

            let err = agg.analyze_contract(&mut contract).await.unwrap_err();

            assert!(matches!(
                err,
                PipelineError::Contract(ContractError::InvalidTransition { from, to: StatusType::Analyzed })
                    if from == before
            ));
            assert_eq!(analyzer.calls(), 0);
            assert_eq!(contract.status_type(), before);
        }
    }

    #[test]
    fn auto_fix_appends_notes_in_order() {
        let agg = aggregator(vec![]);
        let errors = vec![
            finding("clippy", "needless borrow", 12, Severity::Error),
            finding("semgrep", "ignored tool", 3, Severity::Error),
            finding("prusti", "overflow possible", 20, Severity::Critical),
        ];
        let fixed = agg.auto_fix(&code(), &errors);
        assert_eq!(
            fixed.as_str(),
            "use anchor_lang::prelude::*;\npub mod mytoken {}\n\n// Auto-fixes:\n\
             // FIX: needless borrow\n// Original line 12\n\
             // PRUSTI FIX: overflow possible"
        );
    }

    #[test]
    fn auto_fix_is_deterministic() {
        let agg = aggregator(vec![]);
        let errors = vec![finding("clippy", "x", 1, Severity::Error)];
        assert_eq!(agg.auto_fix(&code(), &errors), agg.auto_fix(&code(), &errors));
        assert!(agg.auto_fix(&code(), &errors).as_str().starts_with(code().as_str()));
    }
}
