use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::match_state::{
    derive_features, FeatureRecord, InputError, MatchContext, PredictRequest, Team,
    ValidationError,
};
use crate::model::{ModelInput, WinModel};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

/// One side of the result panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideForecast {
    pub team: Team,
    pub logo: &'static str,
    pub probability: f64,
    /// `probability` as a whole percentage, rounded on its own.
    pub percent: u8,
}

impl SideForecast {
    fn new(team: Team, probability: f64) -> Self {
        SideForecast {
            team,
            logo: team.logo(),
            probability,
            percent: to_percent(probability),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Chasing side, credited with the win probability.
    pub batting: SideForecast,
    /// Defending side, credited with the loss probability.
    pub bowling: SideForecast,
    pub features: FeatureRecord,
    pub input: ModelInput,
}

/// Nearest whole percent, halves to even. The two sides are rounded
/// independently, so they need not add up to 100.
pub fn to_percent(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0).round_ties_even() as u8
}

/// Runs the validate → derive → classify pipeline for one match state.
#[derive(Clone)]
pub struct WinPredictor {
    model: Arc<dyn WinModel>,
}

impl WinPredictor {
    pub fn new(model: Arc<dyn WinModel>) -> Self {
        WinPredictor { model }
    }

    pub fn predict_request(&self, req: &PredictRequest) -> Result<Forecast, PredictError> {
        let ctx = MatchContext::try_from(req)?;
        self.predict(&ctx)
    }

    /// The classifier is only consulted once every validation rule passes.
    pub fn predict(&self, ctx: &MatchContext) -> Result<Forecast, PredictError> {
        let features = derive_features(ctx)?;
        let input = ModelInput::new(ctx, &features);
        debug!(
            "Model input: {} chasing {} v {} at {}, {} off {} balls, {} wickets in hand",
            ctx.target,
            ctx.batting_team,
            ctx.bowling_team,
            ctx.city,
            features.runs_left,
            features.balls_left,
            features.wickets_left
        );

        let [loss, win] = self.model.predict_proba(&input)?;
        for p in [loss, win] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow::anyhow!(
                    "model returned probability {} outside [0, 1]",
                    p
                )
                .into());
            }
        }

        Ok(Forecast {
            batting: SideForecast::new(ctx.batting_team, win),
            bowling: SideForecast::new(ctx.bowling_team, loss),
            features,
            input,
        })
    }
}
