//! Configuration for the contract pipeline
//!
//! Built once at startup and handed to [`crate::ContractPipeline::new`];
//! nothing here is global.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// AI backend configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Static analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Build/deploy configuration
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// AI backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model name sent to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the chat completions API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Generation timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

/// Static analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analyzer identifiers, in merge order
    #[serde(default = "default_analyzers")]
    pub analyzers: Vec<String>,

    /// Per-analyzer timeout in seconds
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,

    /// Treat warning-only results as failures
    #[serde(default)]
    pub warnings_block: bool,
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyzers: default_analyzers(),
            timeout_secs: default_analysis_timeout(),
            warnings_block: false,
        }
    }
}

/// Build/deploy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Anchor workspace the build runs in
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// IDL file holding the deployed address, relative to the workspace
    #[serde(default = "default_idl_path")]
    pub idl_path: PathBuf,

    /// Build timeout in seconds
    #[serde(default = "default_deploy_timeout")]
    pub timeout_secs: u64,
}

impl DeployConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            idl_path: default_idl_path(),
            timeout_secs: default_deploy_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_ai_timeout() -> u64 {
    120
}

fn default_analyzers() -> Vec<String> {
    vec!["clippy".to_string(), "prusti".to_string()]
}

fn default_analysis_timeout() -> u64 {
    300
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_idl_path() -> PathBuf {
    PathBuf::from("target/idl/program.json")
}

fn default_deploy_timeout() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BridgeConfig {
    /// Load configuration: defaults, then an optional file, then `BRIDGE__*` env vars.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&BridgeConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BRIDGE")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("analysis.analyzers")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
