//! Offline training: raw tables → labeled feature table → fitted transform + classifier → artifact.

use super::evaluate::{accuracy, roc_auc};
use super::ingest::{historical_record, outer_merge, HistoricalRecord, RawTable, RowError};
use crate::config::TrainingConfig;
use crate::error::TrainingError;
use crate::features::{FeatureExtractor, FeatureRow, PreprocessingTransform};
use crate::model::{Classifier, LogisticRegression, ModelArtifact, TrainingSummary};
use chrono::NaiveDate;
use ndarray::Array1;
use std::path::Path;
use tracing::{info, warn};

/// Labeled historical records, plus the count of rows rejected at validation.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub records: Vec<HistoricalRecord>,
    pub rejected: usize,
}

impl TrainingSet {
    /// Merge tables on customer id and turn every merged row into a record. A data-quality
    /// gap aborts; a row failing validation is dropped and counted.
    pub fn from_tables(tables: &[RawTable], snapshot: NaiveDate) -> Result<Self, TrainingError> {
        let merged = outer_merge(tables);
        let mut set = TrainingSet::default();
        for (customer_id, cells) in &merged {
            match historical_record(customer_id, cells, snapshot) {
                Ok(record) => set.records.push(record),
                Err(RowError::Rejected(e)) => {
                    warn!(customer_id = %customer_id, field = e.field(), error = %e, "training row rejected");
                    set.rejected += 1;
                }
                Err(RowError::Fatal(e)) => return Err(e),
            }
        }
        Ok(set)
    }

    pub fn positives(&self) -> usize {
        self.records.iter().filter(|r| r.terminated()).count()
    }
}

pub struct TrainingPipeline {
    config: TrainingConfig,
    extractor: FeatureExtractor,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig, snapshot: NaiveDate) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(snapshot),
        }
    }

    pub fn load_tables(&self) -> Result<Vec<RawTable>, TrainingError> {
        let files = [
            &self.config.contract_file,
            &self.config.internet_file,
            &self.config.personal_file,
            &self.config.phone_file,
        ];
        files
            .iter()
            .map(|f| RawTable::read_csv(&self.config.table_path(f)))
            .collect()
    }

    /// Derive, encode and fit. The transform is fitted first; the classifier sees only its output.
    pub fn fit(&self, set: &TrainingSet) -> Result<ModelArtifact, TrainingError> {
        if set.records.is_empty() {
            return Err(TrainingError::NoValidRows { rejected: set.rejected });
        }
        let positives = set.positives();
        if positives == 0 {
            return Err(TrainingError::SingleClass(0));
        }
        if positives == set.records.len() {
            return Err(TrainingError::SingleClass(1));
        }

        info!(rows = set.records.len(), "deriving features");
        let rows: Vec<FeatureRow> = set
            .records
            .iter()
            .map(|r| self.extractor.historical_row(&r.record, r.end_date))
            .collect();
        let labels: Array1<f64> = set
            .records
            .iter()
            .map(|r| if r.terminated() { 1.0 } else { 0.0 })
            .collect();

        let (transform, x) = PreprocessingTransform::fit(&rows)?;
        info!(columns = transform.width(), "preprocessing transform fitted");

        let classifier = LogisticRegression::fit(&self.config.classifier, x.view(), labels.view());
        let scores = classifier.predict_proba_batch(x.view());
        let (scores, labels) = (scores.to_vec(), labels.to_vec());

        let summary = TrainingSummary {
            rows: rows.len(),
            positives,
            rejected_rows: set.rejected,
            train_accuracy: accuracy(&scores, &labels),
            train_roc_auc: roc_auc(&scores, &labels),
        };
        info!(
            rows = summary.rows,
            positives = summary.positives,
            rejected = summary.rejected_rows,
            accuracy = summary.train_accuracy,
            roc_auc = summary.train_roc_auc,
            "classifier fitted"
        );

        Ok(ModelArtifact::new(self.extractor.snapshot(), transform, classifier, summary))
    }

    /// Full run: read tables, build the training set, fit, persist.
    pub fn run(&self, out: &Path) -> Result<ModelArtifact, TrainingError> {
        info!(data_dir = %self.config.data_dir.display(), "loading raw tables");
        let tables = self.load_tables()?;
        let set = TrainingSet::from_tables(&tables, self.extractor.snapshot())?;
        let artifact = self.fit(&set)?;
        artifact.save(out)?;
        Ok(artifact)
    }
}
