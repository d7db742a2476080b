pub mod calibration;
pub mod logistic;

pub use logistic::LogisticPipeline;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::match_state::{City, FeatureRecord, MatchContext, Team};

/// Categorical columns, in the order [`ModelInput::categorical`] yields them.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["batting_team", "bowling_team", "city"];

/// Numeric columns, in the order [`ModelInput::numeric`] yields them.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "runs_left",
    "balls_left",
    "wickets",
    "total_runs_x",
    "crr",
    "rrr",
];

/// One row of classifier input. Field names are the training column names:
/// `wickets` is wickets *left* and `total_runs_x` is the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub runs_left: u32,
    pub balls_left: u16,
    pub wickets: u8,
    pub total_runs_x: u32,
    pub crr: f64,
    pub rrr: f64,
}

impl ModelInput {
    pub fn new(ctx: &MatchContext, features: &FeatureRecord) -> Self {
        ModelInput {
            batting_team: ctx.batting_team,
            bowling_team: ctx.bowling_team,
            city: ctx.city,
            runs_left: features.runs_left,
            balls_left: features.balls_left,
            wickets: features.wickets_left,
            total_runs_x: ctx.target,
            crr: features.crr,
            rrr: features.rrr,
        }
    }

    pub fn categorical(&self) -> [&'static str; 3] {
        [
            self.batting_team.name(),
            self.bowling_team.name(),
            self.city.name(),
        ]
    }

    pub fn numeric(&self) -> [f64; 6] {
        [
            self.runs_left as f64,
            self.balls_left as f64,
            self.wickets as f64,
            self.total_runs_x as f64,
            self.crr,
            self.rrr,
        ]
    }
}

/// Descriptive metadata about the loaded classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub trained_at: Option<DateTime<Utc>>,
    /// Stored coefficients, including the numeric ones.
    pub coefficients: usize,
    pub calibrated: bool,
}

/// A binary classifier over [`ModelInput`] rows.
pub trait WinModel: Send + Sync {
    /// `[loss, win]` probabilities for the batting side.
    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2]>;

    fn info(&self) -> ModelInfo;
}
