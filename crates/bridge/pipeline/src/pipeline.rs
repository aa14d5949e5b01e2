//! Wires the stages together behind one entry point.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use bridge_types::{AnalysisResult, CodeParams, Contract, ContractError, StatusType};

use crate::adapters::{build_analyzers, AnchorBuilder, OpenAiClient};
use crate::analysis::AnalysisAggregator;
use crate::capability::{AiCapability, AnalyzerCapability, BuildCapability};
use crate::config::BridgeConfig;
use crate::deployment::Deployer;
use crate::error::{PipelineError, PipelineResult};
use crate::generation::Generator;
use crate::prompt::PromptBuilder;

/// Outcome of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The contract in its final state (`Deployed` or `Failed`).
    pub contract: Contract,
    /// What the analyzers reported.
    pub analysis: AnalysisResult,
}

impl PipelineRun {
    pub fn is_deployed(&self) -> bool {
        self.contract.status_type() == StatusType::Deployed
    }
}

/// Generation, analysis and deployment with one shared configuration.
pub struct ContractPipeline {
    config: BridgeConfig,
    generator: Generator,
    aggregator: AnalysisAggregator,
    deployer: Deployer,
}

impl ContractPipeline {
    pub fn new(
        config: BridgeConfig,
        ai: Arc<dyn AiCapability>,
        analyzers: Vec<Arc<dyn AnalyzerCapability>>,
        builder: Arc<dyn BuildCapability>,
    ) -> Self {
        let generator = Generator::new(ai, config.ai.timeout());
        let aggregator = AnalysisAggregator::new(analyzers, config.analysis.timeout())
            .with_warnings_blocking(config.analysis.warnings_block);
        let deployer = Deployer::new(builder, config.deploy.timeout());
        Self {
            config,
            generator,
            aggregator,
            deployer,
        }
    }

    /// Wire the OpenAI client, the configured analyzers and `anchor build`.
    pub fn from_config(config: BridgeConfig) -> PipelineResult<Self> {
        let ai = OpenAiClient::from_config(&config.ai)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let analyzers = build_analyzers(&config.analysis)?;
        let builder = AnchorBuilder::from_config(&config.deploy);
        Ok(Self::new(config, Arc::new(ai), analyzers, Arc::new(builder)))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn aggregator(&self) -> &AnalysisAggregator {
        &self.aggregator
    }

    pub fn deployer(&self) -> &Deployer {
        &self.deployer
    }

    /// Generate, analyze and, if analysis passed, deploy.
    ///
    /// Generation errors are returned since no contract exists yet. Later
    /// failures leave the contract `Failed` inside the returned run.
    #[instrument(skip(self, params, custom_prompt), fields(contract_name = %params.contract_name()))]
    pub async fn run(
        &self,
        params: &CodeParams,
        custom_prompt: Option<&str>,
    ) -> PipelineResult<PipelineRun> {
        let mut contract = self.generator.generate(params, custom_prompt).await?;
        let analysis = self.aggregator.analyze_contract(&mut contract).await?;

        if !analysis.is_success {
            info!(contract_id = %contract.id(), findings = analysis.errors.len(), "Analysis rejected contract");
            return Ok(PipelineRun { contract, analysis });
        }

        let code = contract
            .code()
            .cloned()
            .ok_or(ContractError::InvalidTransition {
                from: contract.status_type(),
                to: StatusType::Deployed,
            })?;
        let placeholder = PromptBuilder::placeholder_for(params);

        match self.deployer.deploy(&code, &placeholder).await {
            Ok((program_id, deployed_code)) => {
                contract.record_deployment(program_id)?;
                contract.replace_deployed_code(deployed_code)?;
                info!(contract_id = %contract.id(), "Pipeline finished");
            }
            Err(e) => {
                warn!(contract_id = %contract.id(), error = %e, "Deployment failed");
                contract.mark_failed(e.to_string())?;
            }
        }

        Ok(PipelineRun { contract, analysis })
    }
}
