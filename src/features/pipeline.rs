//! Feature pipeline: validated record → derived features → pre-encoding row.
//!
//! Training and serving both build rows through [`FeatureExtractor`]; they differ only in the
//! end date handed to [`reference_date`].

use super::{reference_date, DerivedFeatures};
use crate::schema::{CategoricalField, RawCustomerRecord};
use chrono::NaiveDate;

/// Numeric columns standardized by the transform, in column order.
pub const NUMERIC_COLUMNS: [&str; 4] = ["monthly_charges", "days_use", "count_services", "count_streaming"];

/// Columns copied through the transform unchanged.
pub const PASSTHROUGH_COLUMNS: [&str; 1] = ["senior_citizen"];

/// One row of the feature table before encoding. Raw columns superseded by derived ones
/// (dates, per-service flags) are not carried.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Literals of [`CategoricalField::ENCODED`], same order
    pub categorical: [&'static str; CategoricalField::ENCODED.len()],
    pub numeric: [f64; NUMERIC_COLUMNS.len()],
    pub passthrough: [f64; PASSTHROUGH_COLUMNS.len()],
}

impl FeatureRow {
    pub fn assemble(record: &RawCustomerRecord, derived: &DerivedFeatures) -> Self {
        Self {
            categorical: CategoricalField::ENCODED.map(|field| record.literal(field)),
            numeric: [
                record.monthly_charges,
                derived.tenure_days as f64,
                f64::from(derived.active_service_count),
                f64::from(derived.streaming_service_count),
            ],
            passthrough: [f64::from(u8::from(record.senior_citizen))],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    snapshot: NaiveDate,
}

impl FeatureExtractor {
    pub fn new(snapshot: NaiveDate) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> NaiveDate {
        self.snapshot
    }

    /// Live request: no end date, tenure measured to the snapshot.
    pub fn serving_row(&self, record: &RawCustomerRecord) -> FeatureRow {
        self.historical_row(record, None)
    }

    /// Training row; `end_date` is set only for terminated customers.
    pub fn historical_row(&self, record: &RawCustomerRecord, end_date: Option<NaiveDate>) -> FeatureRow {
        let derived = DerivedFeatures::derive(record, reference_date(end_date, self.snapshot));
        FeatureRow::assemble(record, &derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BinaryFlag, ContractType, PaymentMethod, ServiceFlag};

    fn record() -> RawCustomerRecord {
        RawCustomerRecord {
            contract_type: ContractType::TwoYear,
            payment_method: PaymentMethod::MailedCheck,
            monthly_charges: 56.95,
            begin_date: NaiveDate::from_ymd_opt(2017, 4, 1).unwrap(),
            paperless_billing: BinaryFlag::No,
            partner: BinaryFlag::Yes,
            dependents: BinaryFlag::No,
            senior_citizen: true,
            multiple_lines: ServiceFlag::NotConnected,
            online_security: ServiceFlag::Yes,
            online_backup: ServiceFlag::No,
            device_protection: ServiceFlag::Yes,
            tech_support: ServiceFlag::No,
            streaming_tv: ServiceFlag::Yes,
            streaming_movies: ServiceFlag::No,
        }
    }

    #[test]
    fn row_layout() {
        let fx = FeatureExtractor::new(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        let row = fx.serving_row(&record());
        assert_eq!(
            row.categorical,
            ["Two year", "No", "Mailed check", "Yes", "No", "Not connected"]
        );
        assert_eq!(row.numeric, [56.95, 1036.0, 2.0, 1.0]);
        assert_eq!(row.passthrough, [1.0]);
    }

    #[test]
    fn serving_row_equals_never_terminated_historical_row() {
        let fx = FeatureExtractor::new(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(fx.serving_row(&record()), fx.historical_row(&record(), None));
    }
}
