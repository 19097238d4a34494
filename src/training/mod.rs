//! Offline training pipeline.

mod evaluate;
mod ingest;
mod pipeline;

pub use evaluate::{accuracy, roc_auc};
pub use ingest::{camel_to_snake, historical_record, outer_merge, HistoricalRecord, RawTable, ReadError, RowError};
pub use pipeline::{TrainingPipeline, TrainingSet};
