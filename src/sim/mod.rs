//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (carried by `Simulation`)
//! - No rendering or platform dependencies

pub mod cpu;
pub mod physics;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod tick;
pub mod trivia;

pub use cpu::update_cpu;
pub use physics::{Projected, RallyEvent, project_to_screen, serve_ball, update_ball};
pub use score::{Award, PointScore, PointValue, Score, SetResult};
pub use snapshot::{Palette, Snapshot};
pub use state::{
    AnswerReveal, Ball, GameState, PointReason, PointRecord, Racket, Side, Simulation,
};
pub use stats::MatchStats;
pub use tick::{TickInput, tick};
pub use trivia::{AnswerResult, QuestionSession, TriviaController};
