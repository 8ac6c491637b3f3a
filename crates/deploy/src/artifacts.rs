//! Compiled artifact lookup.
//!
//! Resolves a contract name to a [`ContractFactory`] by reading the JSON artifacts
//! written by the Solidity toolchain. Two layouts are understood:
//!
//! - Hardhat: `artifacts/contracts/<File>.sol/<Name>.json`, with `contractName`,
//!   `abi` and a hex `bytecode` string.
//! - Foundry: `out/<File>.sol/<Name>.json`, with `abi` and `bytecode.object`.

use std::path::{Path, PathBuf};

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::Context;
use serde::Deserialize;

use crate::{ArtifactSource, ContractFactory, DeploymentError};

/// Directories never containing contract artifacts.
const SKIPPED_DIRS: &[&str] = &["build-info", "cache"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    /// Only present in Hardhat artifacts.
    #[serde(default)]
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: ArtifactBytecode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(String),
    Object { object: String },
}

impl ArtifactBytecode {
    fn as_hex(&self) -> &str {
        match self {
            ArtifactBytecode::Hex(hex) => hex,
            ArtifactBytecode::Object { object } => object,
        }
    }
}

/// Artifact store backed by a build output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find every artifact file named `<contract_name>.json` below the root.
    fn find_candidates(&self, contract_name: &str) -> anyhow::Result<Vec<PathBuf>> {
        let file_name = format!("{contract_name}.json");
        let mut candidates = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to read directory {}", dir.display()))?;

            for entry in entries {
                let entry = entry
                    .with_context(|| format!("Failed to read entry in {}", dir.display()))?;
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .with_context(|| format!("Failed to stat {}", path.display()))?;

                if file_type.is_dir() {
                    let skipped = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                    if !skipped {
                        pending.push(path);
                    }
                } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()) {
                    candidates.push(path);
                }
            }
        }

        candidates.sort();
        Ok(candidates)
    }

    fn load(&self, contract_name: &str, path: &Path) -> anyhow::Result<Option<ContractFactory>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let artifact: ArtifactFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        if artifact
            .contract_name
            .as_deref()
            .is_some_and(|name| name != contract_name)
        {
            return Ok(None);
        }

        let hex = artifact.bytecode.as_hex().trim();
        if hex.contains("__") {
            anyhow::bail!(
                "Artifact {} contains unlinked library references",
                path.display()
            );
        }

        let bytecode: Bytes = hex
            .parse()
            .with_context(|| format!("Invalid bytecode in {}", path.display()))?;

        if bytecode.is_empty() {
            anyhow::bail!(
                "Artifact {} has no bytecode: {} is abstract or an interface",
                path.display(),
                contract_name
            );
        }

        Ok(Some(ContractFactory::new(
            contract_name,
            bytecode,
            artifact.abi.constructor,
        )))
    }
}

impl ArtifactSource for ArtifactStore {
    fn resolve(&self, contract_name: &str) -> Result<ContractFactory, DeploymentError> {
        if !self.root.is_dir() {
            return Err(DeploymentError::resolution(format!(
                "Artifacts directory not found: {} (has the project been compiled?)",
                self.root.display()
            )));
        }

        let candidates = self
            .find_candidates(contract_name)
            .map_err(DeploymentError::Resolution)?;

        let mut factories = Vec::new();
        for path in &candidates {
            if let Some(factory) = self
                .load(contract_name, path)
                .map_err(DeploymentError::Resolution)?
            {
                factories.push((path, factory));
            }
        }

        match factories.len() {
            0 => Err(DeploymentError::resolution(format!(
                "artifact not found: no compiled artifact for {} under {}",
                contract_name,
                self.root.display()
            ))),
            1 => {
                let (path, factory) = factories.remove(0);
                tracing::debug!(
                    contract = %contract_name,
                    artifact = %path.display(),
                    bytecode_len = factory.bytecode().len(),
                    "Artifact loaded"
                );
                Ok(factory)
            }
            _ => Err(DeploymentError::resolution(format!(
                "Multiple artifacts found for {}: {}",
                contract_name,
                factories
                    .iter()
                    .map(|(path, _)| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}
