//! Deployment step: build, read the deployed address, bind it into the code.
//!
//! The deployer never touches a [`bridge_types::Contract`]; the caller
//! records the returned [`ProgramId`] once this step has succeeded.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use bridge_types::{Code, ProgramId};

use crate::capability::BuildCapability;
use crate::error::{PipelineError, PipelineResult};

/// Runs the build capability and substitutes the real address.
pub struct Deployer {
    builder: Arc<dyn BuildCapability>,
    timeout: Duration,
}

impl Deployer {
    pub fn new(builder: Arc<dyn BuildCapability>, timeout: Duration) -> Self {
        Self { builder, timeout }
    }

    /// Build and return the deployed address with `code` rebound to it.
    ///
    /// Every literal occurrence of `placeholder` is replaced.
    #[instrument(skip(self, code), fields(builder = %self.builder.name()))]
    pub async fn deploy(&self, code: &Code, placeholder: &str) -> PipelineResult<(ProgramId, Code)> {
        let artifact = tokio::time::timeout(self.timeout, self.builder.build())
            .await
            .map_err(|_| PipelineError::DeploymentTimedOut {
                after_secs: self.timeout.as_secs(),
            })?
            .map_err(PipelineError::DeploymentFailed)?;

        let program_id = ProgramId::new(artifact.address)?;
        if placeholder.is_empty() {
            return Ok((program_id, code.clone()));
        }
        let occurrences = code.as_str().matches(placeholder).count();
        let updated = code.replace(placeholder, program_id.as_str())?;

        info!(program_id = %program_id, occurrences, "Program deployed");
        Ok((program_id, updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::simulated::SimulatedBuilder;
    use crate::error::CapabilityErrorKind;
    use bridge_types::ContractError;

    const ADDRESS: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    const PLACEHOLDER: &str = "ba7816bf8f01cfea414140de5dae2223";

    fn code() -> Code {
        Code::new(format!(
            "use anchor_lang::prelude::*;\ndeclare_id!(\"{PLACEHOLDER}\");\n// id: {PLACEHOLDER}"
        ))
        .unwrap()
    }

    fn deployer(builder: SimulatedBuilder) -> Deployer {
        Deployer::new(Arc::new(builder), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn deploy_replaces_every_placeholder() {
        let (id, updated) = deployer(SimulatedBuilder::deploying_to(ADDRESS))
            .deploy(&code(), PLACEHOLDER)
            .await
            .unwrap();
        assert_eq!(id.as_str(), ADDRESS);
        assert!(!updated.as_str().contains(PLACEHOLDER));
        assert_eq!(updated.as_str().matches(ADDRESS).count(), 2);
        assert!(updated.as_str().contains(&format!("declare_id!(\"{ADDRESS}\");")));
    }

    #[tokio::test]
    async fn build_failure_is_deployment_failed() {
        let err = deployer(SimulatedBuilder::failing(
            CapabilityErrorKind::NonZeroExit,
            "anchor build exited with status 1",
        ))
        .deploy(&code(), PLACEHOLDER)
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::DeploymentFailed(e) if e.kind == CapabilityErrorKind::NonZeroExit));
    }

    #[tokio::test]
    async fn invalid_address_is_rejected() {
        let err = deployer(SimulatedBuilder::deploying_to("not-an-address"))
            .deploy(&code(), PLACEHOLDER)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Contract(ContractError::InvalidProgramId(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_build_times_out() {
        let builder = SimulatedBuilder::deploying_to(ADDRESS).with_delay(Duration::from_secs(900));
        let err = Deployer::new(Arc::new(builder), Duration::from_secs(600))
            .deploy(&code(), PLACEHOLDER)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::DeploymentTimedOut { after_secs: 600 }));
    }
}
