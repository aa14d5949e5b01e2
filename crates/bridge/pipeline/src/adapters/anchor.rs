//! Build toolchain backed by `anchor build`.
//!
//! The deployed address is read from `metadata.address` in the IDL the
//! build writes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::instrument;

use super::{run_tool, stderr_summary};
use crate::capability::{BuildArtifact, BuildCapability};
use crate::config::DeployConfig;
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult};

/// Runs `anchor build` inside an Anchor workspace.
#[derive(Debug, Clone)]
pub struct AnchorBuilder {
    workspace_dir: PathBuf,
    idl_path: PathBuf,
}

impl AnchorBuilder {
    pub fn new(workspace_dir: impl Into<PathBuf>, idl_path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            idl_path: idl_path.into(),
        }
    }

    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(&config.workspace_dir, &config.idl_path)
    }

    fn idl_file(&self) -> PathBuf {
        self.workspace_dir.join(&self.idl_path)
    }
}

/// Read `metadata.address` from an IDL file.
pub async fn read_idl_address(path: &Path) -> CapabilityResult<String> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        CapabilityError::new(
            CapabilityErrorKind::MissingArtifact,
            format!("cannot read {}: {e}", path.display()),
        )
    })?;
    let idl: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        CapabilityError::new(
            CapabilityErrorKind::Parse,
            format!("{} is not valid JSON: {e}", path.display()),
        )
    })?;
    idl.pointer("/metadata/address")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CapabilityError::new(
                CapabilityErrorKind::MissingArtifact,
                format!("{} has no metadata.address", path.display()),
            )
        })
}

#[async_trait]
impl BuildCapability for AnchorBuilder {
    fn name(&self) -> &str {
        "anchor"
    }

    #[instrument(skip(self), fields(workspace = %self.workspace_dir.display()))]
    async fn build(&self) -> CapabilityResult<BuildArtifact> {
        let mut command = Command::new("anchor");
        command.arg("build").current_dir(&self.workspace_dir);
        let output = run_tool(command).await?;

        if !output.status.success() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::NonZeroExit,
                format!("anchor build exited with {}: {}", output.status, stderr_summary(&output)),
            ));
        }

        let address = read_idl_address(&self.idl_file()).await?;
        Ok(BuildArtifact { address })
    }
}
