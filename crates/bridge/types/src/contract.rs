//! The contract aggregate and its lifecycle.
//!
//! ```text
//! Pending ──update_code──▶ Generated ──record_analysis──▶ Analyzed ──record_deployment──▶ Deployed
//!    │                        │                              │
//!    └────────────────────────┴────────── mark_failed ───────┴──────────────────────────▶ Failed
//! ```
//!
//! Every event either moves the contract along the table in
//! [`StatusType::allowed_next`] or returns `InvalidTransition` and leaves the
//! contract untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::code::Code;
use crate::error::{ContractError, ContractResult};
use crate::finding::AnalysisResult;
use crate::params::CodeParams;
use crate::program_id::ProgramId;
use crate::status::{ContractStatus, StatusType};

/// Unique identifier for a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(Uuid);

impl ContractId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A generated program tracked from request to deployment.
#[derive(Debug, Clone)]
pub struct Contract {
    id: ContractId,
    code: Option<Code>,
    status: ContractStatus,
    program_id: Option<ProgramId>,
    errors: Vec<String>,
    params: CodeParams,
}

impl Contract {
    pub fn create_new(params: CodeParams) -> Self {
        Self {
            id: ContractId::generate(),
            code: None,
            status: ContractStatus::pending(),
            program_id: None,
            errors: Vec::new(),
            params,
        }
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    pub fn status(&self) -> &ContractStatus {
        &self.status
    }

    pub fn status_type(&self) -> StatusType {
        self.status.value()
    }

    pub fn program_id(&self) -> Option<&ProgramId> {
        self.program_id.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn params(&self) -> &CodeParams {
        &self.params
    }

    /// Bind generated code. Only valid while pending.
    pub fn update_code(&mut self, new_code: Code) -> ContractResult<()> {
        self.require(StatusType::Pending, StatusType::Generated)?;
        self.status = self.status.transition_to(StatusType::Generated)?;
        self.code = Some(new_code);
        Ok(())
    }

    /// Record the merged analyzer output. Only valid once generated.
    pub fn record_analysis(&mut self, result: &AnalysisResult) -> ContractResult<()> {
        let next = if result.is_success {
            StatusType::Analyzed
        } else {
            StatusType::Failed
        };
        self.require(StatusType::Generated, next)?;
        self.status = self.status.transition_to(next)?;
        if !result.is_success {
            self.errors.extend(result.messages());
        }
        Ok(())
    }

    /// Bind the on-chain address. Only valid once analyzed.
    pub fn record_deployment(&mut self, program_id: ProgramId) -> ContractResult<()> {
        self.require(StatusType::Analyzed, StatusType::Deployed)?;
        self.status = self.status.transition_to(StatusType::Deployed)?;
        self.program_id = Some(program_id);
        Ok(())
    }

    /// Swap in post-deployment code (placeholder replaced). Only valid once deployed.
    pub fn replace_deployed_code(&mut self, code: Code) -> ContractResult<()> {
        if self.status.value() != StatusType::Deployed {
            return Err(ContractError::InvalidTransition {
                from: self.status.value(),
                to: StatusType::Deployed,
            });
        }
        self.code = Some(code);
        Ok(())
    }

    /// Retire a non-terminal contract after an aborted step.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> ContractResult<()> {
        self.status = self.status.transition_to(StatusType::Failed)?;
        self.errors.push(reason.into());
        Ok(())
    }

    fn require(&self, expected: StatusType, next: StatusType) -> ContractResult<()> {
        if self.status.value() != expected {
            return Err(ContractError::InvalidTransition {
                from: self.status.value(),
                to: next,
            });
        }
        Ok(())
    }
}

/// Serializable snapshot handed to callers outside the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractView {
    pub id: String,
    pub status: StatusType,
    pub code: Option<String>,
    pub program_id: Option<String>,
    pub errors: Vec<String>,
}

impl From<&Contract> for ContractView {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id.to_string(),
            status: contract.status_type(),
            code: contract.code.as_ref().map(|c| c.as_str().to_string()),
            program_id: contract.program_id.as_ref().map(|p| p.as_str().to_string()),
            errors: contract.errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Severity, ValidationError};
    use crate::params::Network;

    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

    fn params() -> CodeParams {
        CodeParams::new("token", "MyToken", None, Network::Testnet)
    }

    fn code() -> Code {
        Code::new("use anchor_lang::prelude::*;\npub mod my_token {}").unwrap()
    }

    fn generated() -> Contract {
        let mut contract = Contract::create_new(params());
        contract.update_code(code()).unwrap();
        contract
    }

    fn analyzed() -> Contract {
        let mut contract = generated();
        contract.record_analysis(&AnalysisResult::clean()).unwrap();
        contract
    }

    fn deployed() -> Contract {
        let mut contract = analyzed();
        contract
            .record_deployment(ProgramId::new(SYSTEM_PROGRAM).unwrap())
            .unwrap();
        contract
    }

    fn failed() -> Contract {
        let mut contract = generated();
        contract.mark_failed("anchor build exited with 1").unwrap();
        contract
    }

    fn failing_result() -> AnalysisResult {
        AnalysisResult {
            is_success: false,
            errors: vec![
                ValidationError::new("clippy", "CLIPPY_ERR", "unused import", 3, Severity::Error),
                ValidationError::new("prusti", "PRUSTI_ERR", "overflow", 9, Severity::Critical),
            ],
        }
    }

    #[test]
    fn create_new_is_pending_and_empty() {
        let contract = Contract::create_new(params());
        assert_eq!(contract.status_type(), StatusType::Pending);
        assert!(contract.code().is_none());
        assert!(contract.program_id().is_none());
        assert!(contract.errors().is_empty());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Contract::create_new(params()).id(), Contract::create_new(params()).id());
    }

    #[test]
    fn update_code_moves_to_generated() {
        let contract = generated();
        assert_eq!(contract.status_type(), StatusType::Generated);
        assert_eq!(contract.code(), Some(&code()));
    }

    #[test]
    fn update_code_outside_pending_fails() {
        for mut contract in [generated(), analyzed(), deployed(), failed()] {
            let before = contract.status_type();
            let err = contract.update_code(code()).unwrap_err();
            assert_eq!(
                err,
                ContractError::InvalidTransition {
                    from: before,
                    to: StatusType::Generated,
                }
            );
            assert_eq!(contract.status_type(), before);
        }
    }

    #[test]
    fn successful_analysis_moves_to_analyzed() {
        let contract = analyzed();
        assert_eq!(contract.status_type(), StatusType::Analyzed);
        assert!(contract.errors().is_empty());
    }

    #[test]
    fn failed_analysis_records_messages() {
        let mut contract = generated();
        contract.record_analysis(&failing_result()).unwrap();
        assert_eq!(contract.status_type(), StatusType::Failed);
        assert_eq!(contract.errors().len(), 2);
        assert!(contract.errors()[0].contains("unused import"));
        assert!(contract.errors()[1].contains("overflow"));
    }

    #[test]
    fn analysis_before_generation_fails() {
        let mut contract = Contract::create_new(params());
        assert!(contract.record_analysis(&AnalysisResult::clean()).is_err());
        assert!(contract.record_analysis(&failing_result()).is_err());
        assert!(contract.errors().is_empty());
        assert_eq!(contract.status_type(), StatusType::Pending);
    }

    #[test]
    fn deployment_requires_analyzed() {
        let id = ProgramId::new(SYSTEM_PROGRAM).unwrap();

        let mut pending = Contract::create_new(params());
        assert!(pending.record_deployment(id.clone()).is_err());
        assert!(pending.program_id().is_none());

        let mut gen = generated();
        assert!(gen.record_deployment(id.clone()).is_err());

        let mut contract = analyzed();
        contract.record_deployment(id.clone()).unwrap();
        assert_eq!(contract.status_type(), StatusType::Deployed);
        assert_eq!(contract.program_id(), Some(&id));

        assert!(contract.record_deployment(id).is_err());
    }

    #[test]
    fn replace_deployed_code_only_after_deploy() {
        let new_code = Code::new("use anchor_lang::prelude::*;\n// deployed").unwrap();
        let mut contract = analyzed();
        assert!(contract.replace_deployed_code(new_code.clone()).is_err());
        contract
            .record_deployment(ProgramId::new(SYSTEM_PROGRAM).unwrap())
            .unwrap();
        contract.replace_deployed_code(new_code.clone()).unwrap();
        assert_eq!(contract.code(), Some(&new_code));
    }

    #[test]
    fn mark_failed_from_terminal_is_rejected() {
        let mut contract = generated();
        contract.mark_failed("anchor build exited with 1").unwrap();
        assert_eq!(contract.status_type(), StatusType::Failed);
        assert_eq!(contract.errors(), ["anchor build exited with 1"]);
        assert!(contract.mark_failed("again").is_err());
        assert_eq!(contract.errors().len(), 1);
    }

    #[test]
    fn view_reflects_contract() {
        let mut contract = analyzed();
        contract
            .record_deployment(ProgramId::new(SYSTEM_PROGRAM).unwrap())
            .unwrap();
        let view = ContractView::from(&contract);
        assert_eq!(view.id, contract.id().to_string());
        assert_eq!(view.status, StatusType::Deployed);
        assert_eq!(view.program_id.as_deref(), Some(SYSTEM_PROGRAM));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "deployed");
    }
}
