//! Feature pipeline benchmark: validate → derive → row assembly, per request.

use chrono::NaiveDate;
use churn_model::features::{DerivedFeatures, FeatureExtractor};
use churn_model::schema::{self, RecordCandidate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn candidate() -> RecordCandidate {
    serde_json::from_value(serde_json::json!({
        "type": "One year",
        "payment_method": "Bank transfer (automatic)",
        "monthly_charges": 89.1,
        "begin_date": "2018-03-01",
        "paperless_billing": "Yes",
        "partner": "Yes",
        "dependents": "No",
        "senior_citizen": 1,
        "multiple_lines": "Yes",
        "online_security": "Yes",
        "online_backup": "No",
        "device_protection": "Yes",
        "tech_support": "Not connected",
        "streaming_tv": "Yes",
        "streaming_movies": "No"
    }))
    .expect("bench candidate")
}

fn bench_validate(c: &mut Criterion) {
    let snapshot = NaiveDate::from_ymd_opt(2020, 2, 1).expect("date");
    let cand = candidate();
    c.bench_function("validate_record", |b| {
        b.iter(|| schema::validate(black_box(&cand), snapshot))
    });
}

fn bench_derive_and_assemble(c: &mut Criterion) {
    let snapshot = NaiveDate::from_ymd_opt(2020, 2, 1).expect("date");
    let record = schema::validate(&candidate(), snapshot).expect("valid record");
    let extractor = FeatureExtractor::new(snapshot);

    c.bench_function("derive_features", |b| {
        b.iter(|| DerivedFeatures::derive(black_box(&record), snapshot))
    });
    c.bench_function("serving_row", |b| b.iter(|| extractor.serving_row(black_box(&record))));
}

criterion_group!(benches, bench_validate, bench_derive_and_assemble);
criterion_main!(benches);
