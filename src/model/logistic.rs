//! One-hot + logistic-regression classifier loaded from a JSON export.
//!
//! The artifact mirrors the trained pipeline: each categorical column maps
//! its levels to a coefficient (the dropped reference level, and any level
//! unseen in training, is simply absent and contributes nothing), each numeric
//! column has one coefficient, and an optional Platt block re-maps the output.
//!
//! ```text
//! z     = intercept + Σ coef(category) + Σ coef(column) · value
//! p_win = platt(sigmoid(z))
//! ```

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::calibration::{sigmoid, PlattCalibration};
use super::{ModelInfo, ModelInput, WinModel, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

#[derive(Debug, Deserialize)]
struct Artifact {
    name: String,
    version: String,
    #[serde(default)]
    trained_at: Option<DateTime<Utc>>,
    intercept: f64,
    #[serde(default)]
    categorical: BTreeMap<String, BTreeMap<String, f64>>,
    numeric: BTreeMap<String, f64>,
    #[serde(default)]
    calibration: Option<PlattCalibration>,
}

#[derive(Debug, Clone)]
pub struct LogisticPipeline {
    name: String,
    version: String,
    trained_at: Option<DateTime<Utc>>,
    intercept: f64,
    /// Level coefficients, indexed like [`CATEGORICAL_COLUMNS`].
    categorical: [BTreeMap<String, f64>; 3],
    /// Indexed like [`NUMERIC_COLUMNS`].
    numeric: [f64; 6],
    calibration: Option<PlattCalibration>,
}

impl LogisticPipeline {
    /// Read and check a model artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid model artifact {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: Artifact =
            serde_json::from_str(raw).context("Failed to parse model artifact JSON")?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(mut artifact: Artifact) -> Result<Self> {
        ensure!(
            artifact.intercept.is_finite(),
            "intercept must be finite, got {}",
            artifact.intercept
        );

        let mut categorical: [BTreeMap<String, f64>; 3] = Default::default();
        for (slot, column) in categorical.iter_mut().zip(CATEGORICAL_COLUMNS) {
            if let Some(levels) = artifact.categorical.remove(column) {
                if let Some((level, coef)) = levels.iter().find(|(_, c)| !c.is_finite()) {
                    bail!("coefficient for {}={} must be finite, got {}", column, level, coef);
                }
                *slot = levels;
            }
        }
        if let Some(column) = artifact.categorical.keys().next() {
            bail!("unexpected categorical column '{}'", column);
        }

        let mut numeric = [0.0; 6];
        for (slot, column) in numeric.iter_mut().zip(NUMERIC_COLUMNS) {
            let coef = artifact
                .numeric
                .remove(column)
                .with_context(|| format!("missing coefficient for numeric column '{}'", column))?;
            ensure!(
                coef.is_finite(),
                "coefficient for '{}' must be finite, got {}",
                column,
                coef
            );
            *slot = coef;
        }
        if let Some(column) = artifact.numeric.keys().next() {
            bail!("unexpected numeric column '{}'", column);
        }

        if let Some(cal) = artifact.calibration {
            ensure!(cal.is_finite(), "calibration parameters must be finite");
        }

        Ok(LogisticPipeline {
            name: artifact.name,
            version: artifact.version,
            trained_at: artifact.trained_at,
            intercept: artifact.intercept,
            categorical,
            numeric,
            calibration: artifact.calibration,
        })
    }

    /// Drop the artifact's Platt block and serve raw probabilities.
    pub fn without_calibration(mut self) -> Self {
        self.calibration = None;
        self
    }

    /// Linear predictor (log-odds of a batting-side win).
    fn decision(&self, input: &ModelInput) -> f64 {
        let categorical: f64 = self
            .categorical
            .iter()
            .zip(input.categorical())
            .filter_map(|(levels, value)| levels.get(value))
            .sum();
        let numeric: f64 = self
            .numeric
            .iter()
            .zip(input.numeric())
            .map(|(coef, value)| coef * value)
            .sum();
        self.intercept + categorical + numeric
    }
}

impl WinModel for LogisticPipeline {
    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2]> {
        let z = self.decision(input);
        let raw = sigmoid(z);
        let win = match self.calibration {
            Some(cal) => cal.apply(raw),
            None => raw,
        };
        debug!("Logistic decision z={:.4} raw={:.4} win={:.4}", z, raw, win);
        ensure!(win.is_finite(), "model produced a non-finite probability (z={})", z);
        Ok([1.0 - win, win])
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            trained_at: self.trained_at,
            coefficients: self.categorical.iter().map(BTreeMap::len).sum::<usize>()
                + self.numeric.len(),
            calibrated: self.calibration.is_some(),
        }
    }
}
