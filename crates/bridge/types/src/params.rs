//! Generation parameters supplied by the requester.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Target Solana cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Network {
    #[default]
    Testnet,
    Devnet,
    Mainnet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl FromStr for Network {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ContractError::InvalidNetwork(other.to_string())),
        }
    }
}

impl TryFrom<String> for Network {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Network> for String {
    fn from(network: Network) -> Self {
        network.as_str().to_string()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to generate. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeParams {
    contract_type: String,
    contract_name: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    network: Network,
}

impl CodeParams {
    pub fn new(
        contract_type: impl Into<String>,
        contract_name: impl Into<String>,
        author: Option<String>,
        network: Network,
    ) -> Self {
        Self {
            contract_type: contract_type.into(),
            contract_name: contract_name.into(),
            author,
            network,
        }
    }

    /// Build from raw request values, validating the network name.
    pub fn parse(
        contract_type: impl Into<String>,
        contract_name: impl Into<String>,
        author: Option<String>,
        network: &str,
    ) -> Result<Self, ContractError> {
        Ok(Self::new(contract_type, contract_name, author, network.parse()?))
    }

    pub fn contract_type(&self) -> &str {
        &self.contract_type
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_networks() {
        for name in ["testnet", "devnet", "mainnet"] {
            let params = CodeParams::parse("token", "MyToken", None, name).unwrap();
            assert_eq!(params.network().as_str(), name);
        }
    }

    #[test]
    fn localnet_is_rejected() {
        let err = CodeParams::parse("token", "MyToken", None, "localnet").unwrap_err();
        assert_eq!(err, ContractError::InvalidNetwork("localnet".into()));
    }

    #[test]
    fn network_defaults_to_testnet() {
        let params: CodeParams =
            serde_json::from_str(r#"{"contract_type":"token","contract_name":"MyToken"}"#).unwrap();
        assert_eq!(params.network(), Network::Testnet);
        assert_eq!(params.author(), None);
    }

    #[test]
    fn deserialize_rejects_unknown_network() {
        let result = serde_json::from_str::<CodeParams>(
            r#"{"contract_type":"token","contract_name":"MyToken","network":"localnet"}"#,
        );
        assert!(result.is_err());
    }
}
