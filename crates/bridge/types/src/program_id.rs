//! On-chain program address.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};

/// Length in bytes of a Solana public key.
pub const PROGRAM_ID_LEN: usize = 32;

/// A base58 address that decodes to exactly 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProgramId(String);

impl ProgramId {
    pub fn new(value: impl Into<String>) -> ContractResult<Self> {
        let value = value.into();
        match bs58::decode(&value).into_vec() {
            Ok(bytes) if bytes.len() == PROGRAM_ID_LEN => Ok(Self(value)),
            Ok(bytes) => Err(ContractError::InvalidProgramId(format!(
                "{value} decodes to {} bytes, expected {PROGRAM_ID_LEN}",
                bytes.len()
            ))),
            Err(e) => Err(ContractError::InvalidProgramId(format!("{value}: {e}"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProgramId {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProgramId> for String {
    fn from(id: ProgramId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
