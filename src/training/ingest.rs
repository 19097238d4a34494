//! Raw table ingestion: CSV → normalized columns → outer merge on customer id → typed rows.

use crate::error::{TrainingError, ValidationError};
use crate::schema::{self, Categorical, CategoricalField, RawCustomerRecord, RecordCandidate, ServiceFlag};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const CUSTOMER_ID: &str = "customer_id";

/// Marks a customer who has not terminated.
const ACTIVE_END_DATE: &str = "No";

/// Non-categorical fields a training row must carry; never gap-filled.
const REQUIRED_SCALARS: [&str; 4] = ["begin_date", "end_date", "monthly_charges", "senior_citizen"];

/// `BeginDate → begin_date`, `customerID → customer_id`, `StreamingTV → streaming_tv`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (next_lower && prev != '_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// One source table keyed by customer id; cells keyed by normalized column name.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: BTreeMap<String, BTreeMap<String, String>>,
}

impl RawTable {
    pub fn read_csv(path: &Path) -> Result<Self, TrainingError> {
        let csv_err = |source| TrainingError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::open(path).map_err(|source| TrainingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_reader(&name, file).map_err(|e| match e {
            ReadError::Csv(source) => csv_err(source),
            ReadError::Training(t) => t,
        })
    }

    pub fn from_reader(name: &str, reader: impl std::io::Read) -> Result<Self, ReadError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(camel_to_snake).collect();
        let id_idx = columns
            .iter()
            .position(|c| c == CUSTOMER_ID)
            .ok_or_else(|| TrainingError::MissingColumn {
                table: name.to_string(),
                column: CUSTOMER_ID,
            })?;

        let mut rows = BTreeMap::new();
        for result in rdr.records() {
            let record = result?;
            let Some(id) = record.get(id_idx).filter(|id| !id.is_empty()) else {
                warn!(table = name, "row without customer id skipped");
                continue;
            };
            let cells: BTreeMap<String, String> = columns
                .iter()
                .zip(record.iter())
                .filter(|(c, _)| c.as_str() != CUSTOMER_ID)
                .map(|(c, v)| (c.clone(), v.to_string()))
                .collect();
            if rows.contains_key(id) {
                warn!(table = name, customer_id = id, "duplicate customer id; first row kept");
                continue;
            }
            rows.insert(id.to_string(), cells);
        }
        debug!(table = name, rows = rows.len(), columns = columns.len(), "table loaded");
        Ok(Self {
            name: name.to_string(),
            columns,
            rows,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Training(#[from] TrainingError),
}

/// Outer merge: every customer present in any table, with the union of its cells.
/// Empty cells are treated as absent.
pub fn outer_merge(tables: &[RawTable]) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut merged: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for table in tables {
        for (id, cells) in &table.rows {
            let row = merged.entry(id.clone()).or_default();
            for (column, value) in cells {
                if !value.is_empty() {
                    row.entry(column.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }
    merged
}

/// Training row: validated record, label source, id.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub customer_id: String,
    pub record: RawCustomerRecord,
    /// Set only for customers who terminated
    pub end_date: Option<NaiveDate>,
}

impl HistoricalRecord {
    pub fn terminated(&self) -> bool {
        self.end_date.is_some()
    }
}

/// Why a merged row did not become a training record.
#[derive(Debug)]
pub enum RowError {
    /// Row-level rejection; training continues without it
    Rejected(ValidationError),
    /// Stops the training run
    Fatal(TrainingError),
}

/// Gap-fill, validate and label one merged row.
pub fn historical_record(
    customer_id: &str,
    cells: &BTreeMap<String, String>,
    snapshot: NaiveDate,
) -> Result<HistoricalRecord, RowError> {
    let mut candidate = RecordCandidate::new();

    for field in REQUIRED_SCALARS {
        let value = cells.get(field).ok_or_else(|| data_quality(customer_id, field))?;
        candidate.insert(field, value.as_str());
    }
    for field in CategoricalField::ALL {
        match cells.get(field.name()) {
            Some(value) => {
                candidate.insert(field.name(), value.as_str());
            }
            None if field.accepts_not_connected() => {
                candidate.insert(field.name(), ServiceFlag::NotConnected.literal());
            }
            None => return Err(data_quality(customer_id, field.name())),
        }
    }

    let record = schema::validate(&candidate, snapshot).map_err(RowError::Rejected)?;
    let end_raw = cells.get("end_date").map_or(ACTIVE_END_DATE, String::as_str);
    let end_date = parse_end_date(end_raw, record.begin_date, snapshot).map_err(RowError::Rejected)?;
    Ok(HistoricalRecord {
        customer_id: customer_id.to_string(),
        record,
        end_date,
    })
}

fn data_quality(customer_id: &str, field: &'static str) -> RowError {
    RowError::Fatal(TrainingError::DataQuality {
        customer_id: customer_id.to_string(),
        field,
    })
}

fn parse_end_date(raw: &str, begin: NaiveDate, snapshot: NaiveDate) -> Result<Option<NaiveDate>, ValidationError> {
    if raw == ACTIVE_END_DATE {
        return Ok(None);
    }
    let end = schema::parse_date(raw).ok_or_else(|| ValidationError::FormatError {
        field: "end_date",
        value: raw.to_string(),
        expected: "'No' or a date formatted YYYY-MM-DD",
    })?;
    if end < begin {
        return Err(ValidationError::FormatError {
            field: "end_date",
            value: raw.to_string(),
            expected: "a date on or after begin_date",
        });
    }
    if end > snapshot {
        return Err(ValidationError::FutureDate {
            field: "end_date",
            value: raw.to_string(),
            snapshot: snapshot.format(schema::DATE_FORMAT).to_string(),
        });
    }
    Ok(Some(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "customerID,BeginDate,EndDate,Type,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges
7590-VHVEG,2020-01-01,No,Month-to-month,Yes,Electronic check,29.85,31.04
5575-GNVDE,2017-04-01,No,One year,No,Mailed check,56.95,2071.84
3668-QPYBK,2019-10-01,2019-12-01,Month-to-month,Yes,Mailed check,53.85,226.17
";
    const PERSONAL: &str = "customerID,gender,SeniorCitizen,Partner,Dependents
7590-VHVEG,Female,0,Yes,No
5575-GNVDE,Male,0,No,No
3668-QPYBK,Male,0,No,No
";
    const INTERNET: &str = "customerID,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies
7590-VHVEG,DSL,No,Yes,No,No,No,No
3668-QPYBK,DSL,Yes,Yes,No,No,No,No
";
    const PHONE: &str = "customerID,MultipleLines
5575-GNVDE,No
3668-QPYBK,No
";

    fn snapshot() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 2, 1).unwrap()
    }

    fn tables() -> Vec<RawTable> {
        [("contract", CONTRACT), ("personal", PERSONAL), ("internet", INTERNET), ("phone", PHONE)]
            .iter()
            .map(|(n, t)| RawTable::from_reader(n, t.as_bytes()).unwrap())
            .collect()
    }

    #[test]
    fn header_normalization() {
        assert_eq!(camel_to_snake("customerID"), "customer_id");
        assert_eq!(camel_to_snake("BeginDate"), "begin_date");
        assert_eq!(camel_to_snake("StreamingTV"), "streaming_tv");
        assert_eq!(camel_to_snake("SeniorCitizen"), "senior_citizen");
        assert_eq!(camel_to_snake("PaperlessBilling"), "paperless_billing");
        assert_eq!(camel_to_snake("gender"), "gender");
        assert_eq!(camel_to_snake("monthly_charges"), "monthly_charges");
    }

    #[test]
    fn missing_id_column_is_reported() {
        let err = RawTable::from_reader("phone", "id,MultipleLines\n1,No\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Training(TrainingError::MissingColumn { column: "customer_id", .. })
        ));
    }

    #[test]
    fn outer_merge_fills_service_gaps_with_not_connected() {
        let merged = outer_merge(&tables());
        assert_eq!(merged.len(), 3);

        // no phone row
        let a = historical_record("7590-VHVEG", &merged["7590-VHVEG"], snapshot()).unwrap();
        assert_eq!(a.record.multiple_lines, ServiceFlag::NotConnected);
        assert_eq!(a.record.online_backup, ServiceFlag::Yes);
        assert!(!a.terminated());

        // no internet row
        let b = historical_record("5575-GNVDE", &merged["5575-GNVDE"], snapshot()).unwrap();
        assert_eq!(b.record.streaming_tv, ServiceFlag::NotConnected);
        assert_eq!(b.record.tech_support, ServiceFlag::NotConnected);
        assert_eq!(b.record.multiple_lines, ServiceFlag::No);

        let c = historical_record("3668-QPYBK", &merged["3668-QPYBK"], snapshot()).unwrap();
        assert_eq!(c.end_date, NaiveDate::from_ymd_opt(2019, 12, 1));
        assert!(c.terminated());
    }

    #[test]
    fn missing_personal_row_is_fatal_not_filled() {
        let mut t = tables();
        t[1].rows.remove("5575-GNVDE");
        let merged = outer_merge(&t);
        match historical_record("5575-GNVDE", &merged["5575-GNVDE"], snapshot()) {
            Err(RowError::Fatal(TrainingError::DataQuality { field, .. })) => assert_eq!(field, "senior_citizen"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn missing_contract_numeric_is_fatal() {
        let mut cells = outer_merge(&tables())["7590-VHVEG"].clone();
        cells.remove("monthly_charges");
        assert!(matches!(
            historical_record("7590-VHVEG", &cells, snapshot()),
            Err(RowError::Fatal(TrainingError::DataQuality { field: "monthly_charges", .. }))
        ));
    }

    #[test]
    fn invalid_rows_are_rejected_not_fatal() {
        let mut cells = outer_merge(&tables())["7590-VHVEG"].clone();
        cells.insert("type".into(), "Weekly".into());
        assert!(matches!(
            historical_record("x", &cells, snapshot()),
            Err(RowError::Rejected(ValidationError::SchemaViolation { field: "type", .. }))
        ));

        let mut cells = outer_merge(&tables())["3668-QPYBK"].clone();
        cells.insert("end_date".into(), "2019-09-01".into());
        assert!(matches!(
            historical_record("x", &cells, snapshot()),
            Err(RowError::Rejected(ValidationError::FormatError { field: "end_date", .. }))
        ));

        cells.insert("end_date".into(), "yes".into());
        assert!(matches!(
            historical_record("x", &cells, snapshot()),
            Err(RowError::Rejected(ValidationError::FormatError { field: "end_date", .. }))
        ));

        cells.insert("end_date".into(), "2019-12- 1".into());
        assert!(matches!(
            historical_record("x", &cells, snapshot()),
            Err(RowError::Rejected(ValidationError::FormatError { field: "end_date", .. }))
        ));

        cells.insert("end_date".into(), "2020-02-02".into());
        assert!(matches!(
            historical_record("x", &cells, snapshot()),
            Err(RowError::Rejected(ValidationError::FutureDate { field: "end_date", .. }))
        ));

        cells.insert("end_date".into(), "2020-02-01".into());
        let on_snapshot = historical_record("x", &cells, snapshot()).unwrap();
        assert_eq!(on_snapshot.end_date, Some(snapshot()));
    }
}
