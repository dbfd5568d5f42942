//! Gameplay tunables
//!
//! Defaults come from `consts`. A page may hand in JSON overrides at startup;
//! after `Simulation::new` accepts a `Tuning` it is never changed again.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Tunables that parameterize (but never alter) the simulation rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    /// Horizontal ball speed for serves and returns (court units/s)
    pub ball_base_speed: f32,
    /// Probability an interrupt opportunity opens a question
    pub question_chance: f32,
    /// Time scale applied while easing into a question
    pub slow_motion_factor: f32,
    /// CPU skill in [0, 1]; higher tracks faster and aims truer
    pub cpu_skill: f32,
    /// Seconds the player has to answer
    pub question_time_limit: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_base_speed: BALL_BASE_SPEED,
            question_chance: QUESTION_CHANCE,
            slow_motion_factor: SLOW_MOTION_FACTOR,
            cpu_skill: CPU_SKILL,
            question_time_limit: QUESTION_TIME_LIMIT,
        }
    }
}

impl Tuning {
    /// Parse overrides on top of the defaults, then validate
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every tunable against its allowed range
    pub fn validate(&self) -> Result<(), TuningError> {
        check("ballBaseSpeed", self.ball_base_speed, "(0, 2000]", |v| {
            v > 0.0 && v <= 2000.0
        })?;
        check("questionChance", self.question_chance, "[0, 1]", |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check("slowMotionFactor", self.slow_motion_factor, "(0, 1]", |v| {
            v > 0.0 && v <= 1.0
        })?;
        check("cpuSkill", self.cpu_skill, "[0, 1]", |v| (0.0..=1.0).contains(&v))?;
        check("questionTimeLimit", self.question_time_limit, "(0, 120]", |v| {
            v > 0.0 && v <= 120.0
        })?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f32,
    range: &'static str,
    ok: impl Fn(f32) -> bool,
) -> Result<(), TuningError> {
    // NaN fails every comparison, so it lands here too
    if ok(value) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange { name, value, range })
    }
}
