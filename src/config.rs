//! Runtime configuration, loaded from a JSON file with defaults for anything absent.

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    /// Where training writes and serving reads the model artifact
    pub artifact_path: PathBuf,
    /// "Now" for active customers. Serving takes the value recorded in the artifact instead.
    pub snapshot_date: NaiveDate,
    pub training: TrainingConfig,
    pub client: ClientConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Directory holding the raw tables
    pub data_dir: PathBuf,
    pub contract_file: String,
    pub internet_file: String,
    pub personal_file: String,
    pub phone_file: String,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// L2 penalty on weights (not on the bias)
    pub l2: f64,
    /// Seeds mini-batch order; same seed and data give the same model
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prediction endpoint of a running serving process
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

pub fn default_snapshot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 1).unwrap_or_default()
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("models/churn_model.json"),
            snapshot_date: default_snapshot_date(),
            training: TrainingConfig::default(),
            client: ClientConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            contract_file: "contract_new.csv".to_string(),
            internet_file: "internet_new.csv".to_string(),
            personal_file: "personal_new.csv".to_string(),
            phone_file: "phone_new.csv".to_string(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            epochs: 200,
            batch_size: 64,
            l2: 1e-3,
            seed: 20625,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/predict/".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl TrainingConfig {
    pub fn table_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

impl ChurnConfig {
    /// Load from JSON file if present; otherwise return default. A file that exists but cannot
    /// be read or parsed is an error, never a silent fallback.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
