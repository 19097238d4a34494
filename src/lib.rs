//! Customer churn prediction with one feature pipeline shared by training and serving.
//!
//! Modular structure:
//! - [`schema`]: Closed categorical domains and the record validator
//! - [`features`]: Derived features, row assembly, frozen preprocessing transform
//! - [`model`]: Classifier capability and the versioned model artifact
//! - [`decision`]: Probability → prediction at the fixed threshold
//! - [`training`]: Raw table ingestion, merge, labeling, fitting
//! - [`serving`]: Load-once serving pipeline and JSON request handler
//! - [`client`]: HTTP client for a remote serving endpoint
//! - [`logging`]: Structured logging

pub mod config;
pub mod error;
pub mod schema;
pub mod features;
pub mod model;
pub mod decision;
pub mod training;
pub mod serving;
pub mod client;
pub mod logging;

pub use config::ChurnConfig;
pub use decision::PredictionResult;
pub use error::{ArtifactError, ClientError, ConfigError, TrainingError, ValidationError};
pub use features::{DerivedFeatures, FeatureVector, PreprocessingTransform};
pub use model::ModelArtifact;
pub use schema::{RawCustomerRecord, RecordCandidate};
pub use serving::ServingPipeline;
pub use training::TrainingPipeline;
pub use logging::StructuredLogger;
