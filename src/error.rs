//! Error kinds per layer. Validation errors are recoverable per record; artifact and
//! training errors are fatal to the process or run that raised them.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Field-level rejection of a single record (serving request or training row).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    Missing { field: &'static str },
    #[error("field '{field}' has value '{value}', expected one of {expected}")]
    SchemaViolation {
        field: &'static str,
        value: String,
        expected: String,
    },
    #[error("field '{field}' has value '{value}', expected {expected}")]
    FormatError {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("field '{field}' is {value}, which is after the snapshot date {snapshot}")]
    FutureDate {
        field: &'static str,
        value: String,
        snapshot: String,
    },
}

/// Wire form of a [`ValidationError`] for the serving response.
#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorBody {
    pub kind: &'static str,
    pub field: &'static str,
    pub expected: String,
    pub message: String,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::SchemaViolation { field, .. }
            | ValidationError::FormatError { field, .. }
            | ValidationError::FutureDate { field, .. } => field,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Missing { .. } => "missing_field",
            ValidationError::SchemaViolation { .. } => "schema_violation",
            ValidationError::FormatError { .. } => "format_error",
            ValidationError::FutureDate { .. } => "future_date",
        }
    }

    /// Expected domain or format, as shown to the caller.
    pub fn expected(&self) -> String {
        match self {
            ValidationError::Missing { .. } => "a value".to_string(),
            ValidationError::SchemaViolation { expected, .. } => expected.clone(),
            ValidationError::FormatError { expected, .. } => expected.to_string(),
            ValidationError::FutureDate { snapshot, .. } => format!("a date on or before {}", snapshot),
        }
    }

    pub fn to_body(&self) -> FieldErrorBody {
        FieldErrorBody {
            kind: self.kind(),
            field: self.field(),
            expected: self.expected(),
            message: self.to_string(),
        }
    }
}

/// Failure to bring a serving process (or any consumer) up on an artifact. Always fatal.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {0}")]
    Missing(PathBuf),
    #[error("model artifact io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not decodable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("model artifact checksum mismatch (expected {expected}, computed {computed})")]
    ChecksumMismatch { expected: String, computed: String },
    #[error("model artifact format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("model artifact is internally inconsistent: {0}")]
    Inconsistent(String),
}

/// A config file that exists but cannot be used. Absent files fall back to defaults instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Preprocessing fit/apply failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("cannot fit preprocessing transform on an empty table")]
    EmptyTable,
    #[error("numeric column '{0}' contains a non-finite value")]
    NonFinite(&'static str),
}

/// Fatal to a training run.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("cannot read table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("table {table} has no '{column}' column")]
    MissingColumn { table: String, column: &'static str },
    #[error("data quality: customer '{customer_id}' has no value for required field '{field}'")]
    DataQuality {
        customer_id: String,
        field: &'static str,
    },
    #[error("no valid training rows ({rejected} rejected)")]
    NoValidRows { rejected: usize },
    #[error("training labels contain a single class ({0}); both churned and active customers are required")]
    SingleClass(u8),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("cannot write artifact: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Remote serving endpoint failures, surfaced to the caller without retry.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("serving endpoint unreachable: {0}")]
    Transport(String),
    #[error("serving endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serving endpoint response not decodable: {0}")]
    Decode(String),
}
