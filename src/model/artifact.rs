//! Versioned model artifact: fitted transform + classifier + column order, as one JSON blob.
//!
//! On disk the artifact is an envelope `{format_version, checksum, payload}`; the checksum is
//! SHA-256 over the exact payload bytes, so a truncated or edited file never loads.

use super::{Classifier, LogisticRegression};
use crate::error::ArtifactError;
use crate::features::PreprocessingTransform;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub rows: usize,
    pub positives: usize,
    pub rejected_rows: usize,
    pub train_accuracy: f64,
    pub train_roc_auc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub artifact_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// "Now" for every non-terminated record, at training and at serving time
    pub snapshot_date: NaiveDate,
    pub feature_columns: Vec<String>,
    pub transform: PreprocessingTransform,
    pub classifier: LogisticRegression,
    pub training_summary: TrainingSummary,
}

#[derive(Serialize, Deserialize)]
struct Envelope<P> {
    format_version: u32,
    checksum: String,
    payload: P,
}

#[derive(Deserialize)]
struct VersionHeader {
    format_version: u32,
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{:02x}", b)).collect()
}

impl ModelArtifact {
    pub fn new(
        snapshot_date: NaiveDate,
        transform: PreprocessingTransform,
        classifier: LogisticRegression,
        training_summary: TrainingSummary,
    ) -> Self {
        Self {
            artifact_id: Uuid::new_v4(),
            created_at: Utc::now(),
            snapshot_date,
            feature_columns: transform.feature_names(),
            transform,
            classifier,
            training_summary,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let payload = serde_json::to_string(self)?;
        let envelope = Envelope {
            format_version: FORMAT_VERSION,
            checksum: sha256_hex(payload.as_bytes()),
            payload: RawValue::from_string(payload)?,
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let header: VersionHeader = serde_json::from_slice(bytes)?;
        if header.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let envelope: Envelope<Box<RawValue>> = serde_json::from_slice(bytes)?;
        let computed = sha256_hex(envelope.payload.get().as_bytes());
        if computed != envelope.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: envelope.checksum,
                computed,
            });
        }
        let artifact: ModelArtifact = serde_json::from_str(envelope.payload.get())?;
        artifact.check_consistency()?;
        Ok(artifact)
    }

    /// Write atomically: a reader never observes a partial artifact at `path`.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = path.with_extension("partial");
        let written = std::fs::write(&tmp, self.to_bytes()?).and_then(|()| std::fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        info!(
            path = %path.display(),
            artifact_id = %self.artifact_id,
            columns = self.feature_columns.len(),
            "model artifact saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Missing(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        self.transform.check_layout().map_err(ArtifactError::Inconsistent)?;
        if self.feature_columns != self.transform.feature_names() {
            return Err(ArtifactError::Inconsistent(
                "recorded feature columns differ from the transform's columns".to_string(),
            ));
        }
        if self.classifier.input_dim() != self.transform.width() {
            return Err(ArtifactError::Inconsistent(format!(
                "classifier expects {} inputs, transform produces {}",
                self.classifier.input_dim(),
                self.transform.width()
            )));
        }
        Ok(())
    }
}
