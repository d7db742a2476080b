//! Second-innings feature derivation.
//!
//! A match state is checked against four rules, in order, and the first one
//! that fails is reported as a user-facing warning. Only a state that passes
//! all of them is turned into a [`FeatureRecord`]:
//!
//! 1. batting and bowling teams differ
//! 2. at least one ball has been bowled
//! 3. the target has not been reached
//! 4. the batting side is not all out

use serde::Serialize;
use thiserror::Error;

use super::models::{MatchContext, BALLS_PER_OVER, TOTAL_WICKETS};

/// A rule violation. The message is what the form shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Batting and Bowling team must be different.")]
    SameTeams,
    #[error("Overs completed must be greater than 0.")]
    NoBallsBowled,
    #[error("Current score must be less than the target.")]
    TargetReached,
    #[error("Wickets lost must be less than 10.")]
    AllOut,
}

/// Model features derived from a valid match state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub runs_left: u32,
    pub balls_left: u16,
    pub wickets_left: u8,
    /// Current run rate, runs per over.
    pub crr: f64,
    /// Required run rate, runs per over; 0 once no balls remain.
    pub rrr: f64,
}

pub fn validate(ctx: &MatchContext) -> Result<(), ValidationError> {
    if ctx.batting_team == ctx.bowling_team {
        return Err(ValidationError::SameTeams);
    }
    if ctx.overs.is_zero() {
        return Err(ValidationError::NoBallsBowled);
    }
    if ctx.score >= ctx.target {
        return Err(ValidationError::TargetReached);
    }
    if ctx.wickets_lost >= TOTAL_WICKETS {
        return Err(ValidationError::AllOut);
    }
    Ok(())
}

/// Validate `ctx` and derive its feature record.
pub fn derive_features(ctx: &MatchContext) -> Result<FeatureRecord, ValidationError> {
    validate(ctx)?;

    let runs_left = ctx.target - ctx.score;
    let balls_left = ctx.overs.balls_left();
    let wickets_left = TOTAL_WICKETS - ctx.wickets_lost;
    let crr = ctx.score as f64 / ctx.overs.value();
    let rrr = if balls_left > 0 {
        (runs_left as f64 * BALLS_PER_OVER as f64) / balls_left as f64
    } else {
        0.0
    };

    Ok(FeatureRecord {
        runs_left,
        balls_left,
        wickets_left,
        crr,
        rrr,
    })
}
