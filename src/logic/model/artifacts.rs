//! Model Artifacts - JSON loading & integrity manifest
//!
//! Every artifact is a plain JSON document in the model directory. An
//! optional `manifest.json` pins each file to its SHA-256 digest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::MANIFEST_FILE;
use crate::error::{Result, TriageError};

/// Read and deserialize one JSON artifact
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read(path)
        .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))?;
    serde_json::from_slice(&raw)
        .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))
}

/// Lowercase hex SHA-256 of a file's bytes
pub fn digest_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Artifact file name → expected SHA-256 (hex)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactManifest {
    #[serde(default)]
    pub version: Option<String>,
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Load `manifest.json` from `dir` if it exists
    pub fn load_optional(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        load_json(&path).map(Some)
    }

    /// Build a manifest for the given files (used by tests and tooling)
    pub fn compute(dir: &Path, files: &[&str]) -> Result<Self> {
        let mut digests = BTreeMap::new();
        for name in files {
            digests.insert(name.to_string(), digest_file(&dir.join(name))?);
        }
        Ok(Self {
            version: None,
            files: digests,
        })
    }

    /// Every listed file must exist and match its digest
    pub fn verify(&self, dir: &Path) -> Result<()> {
        for (name, expected) in &self.files {
            let path: PathBuf = dir.join(name);
            let actual = digest_file(&path)?;
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(TriageError::artifact(
                    path.display().to_string(),
                    format!("SHA-256 mismatch: manifest {}, file {}", expected, actual),
                ));
            }
            log::debug!("Artifact {} verified", name);
        }
        log::info!("Manifest verified ({} artifacts)", self.files.len());
        Ok(())
    }
}
