//! Derived features over a single validated record.

use crate::schema::{RawCustomerRecord, ServiceFlag};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference date for tenure.
///
/// Terminated historical rows measure tenure up to their own end date; active rows and every
/// live request measure it up to the snapshot date. Training and serving both go through here.
pub fn reference_date(end_date: Option<NaiveDate>, snapshot: NaiveDate) -> NaiveDate {
    end_date.unwrap_or(snapshot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Whole days from contract start to the reference date
    pub tenure_days: i64,
    /// Active add-ons among online security, online backup, device protection, tech support
    pub active_service_count: u8,
    /// Active streaming TV / streaming movies
    pub streaming_service_count: u8,
}

impl DerivedFeatures {
    pub const ADD_ON_SERVICES: usize = 4;
    pub const STREAMING_SERVICES: usize = 2;

    pub fn derive(record: &RawCustomerRecord, reference_date: NaiveDate) -> Self {
        let add_ons = [
            record.online_security,
            record.online_backup,
            record.device_protection,
            record.tech_support,
        ];
        let streaming = [record.streaming_tv, record.streaming_movies];
        Self {
            tenure_days: (reference_date - record.begin_date).num_days(),
            active_service_count: count_active(&add_ons),
            streaming_service_count: count_active(&streaming),
        }
    }
}

fn count_active(flags: &[ServiceFlag]) -> u8 {
    flags.iter().filter(|f| f.is_active()).count() as u8
}
