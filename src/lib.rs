//! Tennis Trivia - a tennis rally arcade game with trivia interrupts
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rally physics, CPU, scoring, trivia, state machine)
//! - `questions`: Fixed in-memory question bank and shuffled draw order
//! - `tuning`: Validated gameplay tunables
//! - `game_loop`: Fixed-timestep driver turning frame time into ticks
//! - `web`: Browser bindings (wasm32 only)

pub mod error;
pub mod game_loop;
pub mod questions;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{BankError, ScoreError, SetupError, TuningError};
pub use game_loop::GameLoop;
pub use questions::{Category, Question, QuestionBank};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the loop will account for (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Canvas dimensions: court panel 800 + scoreboard panel 260
    pub const CANVAS_WIDTH: u32 = 1060;
    pub const CANVAS_HEIGHT: u32 = 600;
    pub const COURT_PANEL_WIDTH: f32 = 800.0;

    /// Court geometry in court units. x runs from the player's baseline (0)
    /// to the CPU's baseline, y across the court, z is height above ground.
    pub const COURT_LENGTH: f32 = 640.0;
    pub const COURT_WIDTH: f32 = 300.0;
    pub const NET_X: f32 = COURT_LENGTH / 2.0;
    pub const NET_HEIGHT: f32 = 14.0;

    /// Racket hit planes sit just behind each baseline
    pub const PLAYER_RACKET_X: f32 = -30.0;
    pub const CPU_RACKET_X: f32 = COURT_LENGTH + 30.0;
    /// Lateral half-reach of a racket
    pub const RACKET_REACH: f32 = 30.0;
    /// Highest ball a racket can still play
    pub const RACKET_REACH_HEIGHT: f32 = 110.0;
    /// How far past a racket plane the ball travels before it is dead
    pub const RUNOFF: f32 = 60.0;
    /// Lateral margin rackets may move outside the sidelines
    pub const RACKET_MARGIN: f32 = 40.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    pub const GRAVITY: f32 = 600.0;
    /// Fraction of vertical speed kept on a bounce
    pub const RESTITUTION: f32 = 0.65;
    /// Serve height above the court
    pub const SERVE_HEIGHT: f32 = 60.0;

    /// Phase timings (seconds)
    pub const SERVE_DELAY: f32 = 0.8;
    pub const POINT_PAUSE: f32 = 1.2;
    pub const QUESTION_EASE_IN: f32 = 0.5;

    /// Default tunables
    pub const BALL_BASE_SPEED: f32 = 420.0;
    pub const QUESTION_CHANCE: f32 = 0.25;
    pub const SLOW_MOTION_FACTOR: f32 = 0.3;
    pub const CPU_SKILL: f32 = 0.7;
    pub const QUESTION_TIME_LIMIT: f32 = 10.0;

    /// CPU racket speed at full skill (court units per second)
    pub const CPU_MAX_SPEED: f32 = 480.0;
    /// Largest lateral aiming error at zero skill
    pub const CPU_MAX_ERROR: f32 = 45.0;

    /// Perspective projection of the court onto the court panel
    pub const SCREEN_NEAR_Y: f32 = 540.0;
    pub const SCREEN_FAR_Y: f32 = 300.0;
    pub const FAR_SCALE: f32 = 0.6;

    /// Presentation colors
    pub const COURT_COLOR: &str = "#2f7d4a";
    pub const LINE_COLOR: &str = "#f4f4f4";
    pub const NET_COLOR: &str = "#d8d8d8";
    pub const BALL_COLOR: &str = "#e3f542";
    pub const PLAYER_COLOR: &str = "#3b82f6";
    pub const CPU_COLOR: &str = "#ef4444";
    pub const SCOREBOARD_COLOR: &str = "#1b1f2a";
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = (target - current).clamp(-max_delta, max_delta);
    current + delta
}

/// Clamp a lateral racket position to the playable strip
#[inline]
pub fn clamp_lateral(y: f32) -> f32 {
    use consts::{COURT_WIDTH, RACKET_MARGIN};
    y.clamp(-RACKET_MARGIN, COURT_WIDTH + RACKET_MARGIN)
}
