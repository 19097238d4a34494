//! Frozen preprocessing: one-hot for categoricals (first category dropped), standardization for
//! numerics, passthrough for the rest. Fitted once on the training table, then only applied.

use super::pipeline::{FeatureRow, NUMERIC_COLUMNS, PASSTHROUGH_COLUMNS};
use super::FeatureVector;
use crate::error::TransformError;
use crate::schema::CategoricalField;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OneHotColumn {
    field: String,
    /// Sorted categories seen at fit time; the first one is the dropped reference
    categories: Vec<String>,
}

impl OneHotColumn {
    fn encoded(&self) -> &[String] {
        self.categories.get(1..).unwrap_or(&[])
    }

    /// Reference and unseen categories both encode to all zeros.
    fn encode_into(&self, literal: &str, out: &mut Vec<f64>) {
        out.extend(self.encoded().iter().map(|c| if c == literal { 1.0 } else { 0.0 }));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScaledColumn {
    name: String,
    mean: f64,
    /// Population standard deviation; 1.0 when the column is constant
    scale: f64,
}

impl ScaledColumn {
    fn fit(name: &'static str, values: impl Iterator<Item = f64> + Clone) -> Result<Self, TransformError> {
        let n = values.clone().count() as f64;
        let mut sum = 0.0;
        for v in values.clone() {
            if !v.is_finite() {
                return Err(TransformError::NonFinite(name));
            }
            sum += v;
        }
        let mean = sum / n;
        let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std = var.sqrt();
        Ok(Self {
            name: name.to_string(),
            mean,
            scale: if std > 0.0 { std } else { 1.0 },
        })
    }

    fn apply(&self, v: f64) -> f64 {
        (v - self.mean) / self.scale
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingTransform {
    one_hot: Vec<OneHotColumn>,
    numeric: Vec<ScaledColumn>,
    passthrough: Vec<String>,
}

impl PreprocessingTransform {
    /// Learn encodings and scaling from the full training table; returns the encoded matrix.
    pub fn fit(rows: &[FeatureRow]) -> Result<(Self, Array2<f64>), TransformError> {
        if rows.is_empty() {
            return Err(TransformError::EmptyTable);
        }

        let one_hot = CategoricalField::ENCODED
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let seen: BTreeSet<&str> = rows.iter().map(|r| r.categorical[i]).collect();
                OneHotColumn {
                    field: field.name().to_string(),
                    categories: seen.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();

        let numeric = NUMERIC_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, name)| ScaledColumn::fit(*name, rows.iter().map(move |r| r.numeric[i])))
            .collect::<Result<Vec<_>, _>>()?;

        let transform = Self {
            one_hot,
            numeric,
            passthrough: PASSTHROUGH_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let matrix = transform.apply(rows);
        Ok((transform, matrix))
    }

    /// Encode one row with the fitted parameters.
    pub fn apply_one(&self, row: &FeatureRow) -> FeatureVector {
        let mut values = Vec::with_capacity(self.width());
        for (column, literal) in self.one_hot.iter().zip(row.categorical.iter()) {
            column.encode_into(literal, &mut values);
        }
        for (column, v) in self.numeric.iter().zip(row.numeric.iter()) {
            values.push(column.apply(*v));
        }
        values.extend(row.passthrough.iter().copied());
        FeatureVector { values }
    }

    pub fn apply(&self, rows: &[FeatureRow]) -> Array2<f64> {
        let mut matrix = Array2::zeros((rows.len(), self.width()));
        for (mut out, row) in matrix.rows_mut().into_iter().zip(rows) {
            for (slot, v) in out.iter_mut().zip(self.apply_one(row).values) {
                *slot = v;
            }
        }
        matrix
    }

    pub fn width(&self) -> usize {
        self.one_hot.iter().map(|c| c.encoded().len()).sum::<usize>() + self.numeric.len() + self.passthrough.len()
    }

    /// Column names in vector order: `field=literal` for one-hot columns.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for column in &self.one_hot {
            names.extend(column.encoded().iter().map(|c| format!("{}={}", column.field, c)));
        }
        names.extend(self.numeric.iter().map(|c| c.name.clone()));
        names.extend(self.passthrough.iter().cloned());
        names
    }

    /// Column layout must match the row layout this build produces.
    pub fn check_layout(&self) -> Result<(), String> {
        let fields: Vec<&str> = self.one_hot.iter().map(|c| c.field.as_str()).collect();
        let expected: Vec<&str> = CategoricalField::ENCODED.iter().map(|f| f.name()).collect();
        if fields != expected {
            return Err(format!("categorical columns {:?}, expected {:?}", fields, expected));
        }
        let numeric: Vec<&str> = self.numeric.iter().map(|c| c.name.as_str()).collect();
        if numeric != NUMERIC_COLUMNS {
            return Err(format!("numeric columns {:?}, expected {:?}", numeric, NUMERIC_COLUMNS));
        }
        if self.passthrough != PASSTHROUGH_COLUMNS {
            return Err(format!("passthrough columns {:?}, expected {:?}", self.passthrough, PASSTHROUGH_COLUMNS));
        }
        if self.numeric.iter().any(|c| !c.mean.is_finite() || !(c.scale > 0.0)) {
            return Err("non-finite or non-positive scaling parameters".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(contract: &'static str, lines: &'static str, charges: f64, days: f64) -> FeatureRow {
        FeatureRow {
            categorical: [contract, "Yes", "Electronic check", "No", "No", lines],
            numeric: [charges, days, 1.0, 0.0],
            passthrough: [0.0],
        }
    }

    fn table() -> Vec<FeatureRow> {
        vec![
            row("Month-to-month", "No", 20.0, 10.0),
            row("One year", "Yes", 40.0, 20.0),
            row("Two year", "No", 60.0, 30.0),
        ]
    }

    #[test]
    fn fit_layout_and_names() {
        let (t, m) = PreprocessingTransform::fit(&table()).unwrap();
        // type: 2 cols, billing: 0, payment: 0, partner: 0, dependents: 0, lines: 1, numeric 4, passthrough 1
        assert_eq!(t.width(), 8);
        assert_eq!(m.dim(), (3, 8));
        assert_eq!(
            t.feature_names(),
            vec![
                "type=One year",
                "type=Two year",
                "multiple_lines=Yes",
                "monthly_charges",
                "days_use",
                "count_services",
                "count_streaming",
                "senior_citizen",
            ]
        );
        assert!(t.check_layout().is_ok());
    }

    #[test]
    fn reference_category_and_unknown_encode_to_zeros() {
        let (t, _) = PreprocessingTransform::fit(&table()).unwrap();
        let reference = t.apply_one(&row("Month-to-month", "No", 40.0, 20.0));
        assert_eq!(&reference.values[..3], &[0.0, 0.0, 0.0]);
        let unseen = t.apply_one(&row("Month-to-month", "Not connected", 40.0, 20.0));
        assert_eq!(&unseen.values[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(unseen.len(), t.width());
        let two_year = t.apply_one(&row("Two year", "Yes", 40.0, 20.0));
        assert_eq!(&two_year.values[..3], &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn standardization_uses_population_std() {
        let (t, m) = PreprocessingTransform::fit(&table()).unwrap();
        let charges: Vec<f64> = m.column(3).to_vec();
        let std = (800.0f64 / 3.0).sqrt();
        assert!((charges[0] + 20.0 / std).abs() < 1e-12);
        assert_eq!(charges[1], 0.0);
        // constant column: scale 1, centered to 0
        assert!(m.column(5).iter().all(|v| *v == 0.0));
        assert_eq!(t.apply_one(&row("One year", "No", 40.0, 20.0)).values[3], 0.0);
    }

    #[test]
    fn apply_matches_fit_output_bit_for_bit() {
        let rows = table();
        let (t, fitted) = PreprocessingTransform::fit(&rows).unwrap();
        assert_eq!(t.apply(&rows), fitted);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(t.apply_one(r).values, fitted.row(i).to_vec());
        }
    }

    #[test]
    fn fit_rejects_empty_and_non_finite() {
        assert_eq!(PreprocessingTransform::fit(&[]).unwrap_err(), TransformError::EmptyTable);
        let mut rows = table();
        rows[1].numeric[1] = f64::NAN;
        assert_eq!(PreprocessingTransform::fit(&rows).unwrap_err(), TransformError::NonFinite("days_use"));
    }

    #[test]
    fn serde_roundtrip_preserves_parameters() {
        let (t, _) = PreprocessingTransform::fit(&table()).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: PreprocessingTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
