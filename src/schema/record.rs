//! Record validator: untyped candidate (request body or merged training row) → typed record.

use super::{BinaryFlag, Categorical, CategoricalField, ContractType, PaymentMethod, ServiceFlag};
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Calendar format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field name → raw value, before validation. Unknown keys are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCandidate(Map<String, Value>);

impl RecordCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

impl From<Map<String, Value>> for RecordCandidate {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A customer record whose every field is inside its declared domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCustomerRecord {
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub payment_method: PaymentMethod,
    pub monthly_charges: f64,
    pub begin_date: NaiveDate,
    pub paperless_billing: BinaryFlag,
    pub partner: BinaryFlag,
    pub dependents: BinaryFlag,
    #[serde(serialize_with = "serialize_flag_as_int")]
    pub senior_citizen: bool,
    pub multiple_lines: ServiceFlag,
    pub online_security: ServiceFlag,
    pub online_backup: ServiceFlag,
    pub device_protection: ServiceFlag,
    pub tech_support: ServiceFlag,
    pub streaming_tv: ServiceFlag,
    pub streaming_movies: ServiceFlag,
}

fn serialize_flag_as_int<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*flag))
}

impl RawCustomerRecord {
    /// Literal of a categorical field, as seen by the preprocessing transform.
    pub fn literal(&self, field: CategoricalField) -> &'static str {
        match field {
            CategoricalField::ContractType => self.contract_type.literal(),
            CategoricalField::PaymentMethod => self.payment_method.literal(),
            CategoricalField::PaperlessBilling => self.paperless_billing.literal(),
            CategoricalField::Partner => self.partner.literal(),
            CategoricalField::Dependents => self.dependents.literal(),
            CategoricalField::MultipleLines => self.multiple_lines.literal(),
            CategoricalField::OnlineSecurity => self.online_security.literal(),
            CategoricalField::OnlineBackup => self.online_backup.literal(),
            CategoricalField::DeviceProtection => self.device_protection.literal(),
            CategoricalField::TechSupport => self.tech_support.literal(),
            CategoricalField::StreamingTv => self.streaming_tv.literal(),
            CategoricalField::StreamingMovies => self.streaming_movies.literal(),
        }
    }

    /// Wire form, accepted back by [`validate`].
    pub fn to_candidate(&self) -> RecordCandidate {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => RecordCandidate(map),
            _ => RecordCandidate::default(),
        }
    }
}

/// Validate a candidate against the registry domains. `snapshot` bounds `begin_date` from above.
pub fn validate(candidate: &RecordCandidate, snapshot: NaiveDate) -> Result<RawCustomerRecord, ValidationError> {
    let contract_type = categorical(candidate, CategoricalField::ContractType)?;
    let payment_method = categorical(candidate, CategoricalField::PaymentMethod)?;
    let monthly_charges = charges(candidate, "monthly_charges")?;
    let begin_date = date(candidate, "begin_date")?;
    if begin_date > snapshot {
        return Err(ValidationError::FutureDate {
            field: "begin_date",
            value: begin_date.format(DATE_FORMAT).to_string(),
            snapshot: snapshot.format(DATE_FORMAT).to_string(),
        });
    }

    Ok(RawCustomerRecord {
        contract_type,
        payment_method,
        monthly_charges,
        begin_date,
        paperless_billing: categorical(candidate, CategoricalField::PaperlessBilling)?,
        partner: categorical(candidate, CategoricalField::Partner)?,
        dependents: categorical(candidate, CategoricalField::Dependents)?,
        senior_citizen: zero_one(candidate, "senior_citizen")?,
        multiple_lines: categorical(candidate, CategoricalField::MultipleLines)?,
        online_security: categorical(candidate, CategoricalField::OnlineSecurity)?,
        online_backup: categorical(candidate, CategoricalField::OnlineBackup)?,
        device_protection: categorical(candidate, CategoricalField::DeviceProtection)?,
        tech_support: categorical(candidate, CategoricalField::TechSupport)?,
        streaming_tv: categorical(candidate, CategoricalField::StreamingTv)?,
        streaming_movies: categorical(candidate, CategoricalField::StreamingMovies)?,
    })
}

fn required<'a>(candidate: &'a RecordCandidate, field: &'static str) -> Result<&'a Value, ValidationError> {
    candidate.get(field).ok_or(ValidationError::Missing { field })
}

fn categorical<T: Categorical>(candidate: &RecordCandidate, field: CategoricalField) -> Result<T, ValidationError> {
    let value = required(candidate, field.name())?;
    let violation = |shown: String| ValidationError::SchemaViolation {
        field: field.name(),
        value: shown,
        expected: field.describe_domain(),
    };
    let text = value.as_str().ok_or_else(|| violation(value.to_string()))?;
    T::from_literal(text).ok_or_else(|| violation(text.to_string()))
}

fn charges(candidate: &RecordCandidate, field: &'static str) -> Result<f64, ValidationError> {
    let value = required(candidate, field)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ValidationError::FormatError {
            field,
            value: display(value),
            expected: "a finite number >= 0",
        }),
    }
}

fn zero_one(candidate: &RecordCandidate, field: &'static str) -> Result<bool, ValidationError> {
    let value = required(candidate, field)?;
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::FormatError {
        field,
        value: display(value),
        expected: "0 or 1",
    })
}

fn date(candidate: &RecordCandidate, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let value = required(candidate, field)?;
    let err = || ValidationError::FormatError {
        field,
        value: display(value),
        expected: "a date formatted YYYY-MM-DD",
    };
    let text = value.as_str().ok_or_else(err)?;
    parse_date(text).ok_or_else(err)
}

/// Strict `YYYY-MM-DD`: four-digit year, zero-padded month and day, no sign or padding.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
