//! Game state and core simulation types
//!
//! `Simulation` is the single context every update call works on. It owns the
//! ball, both rackets, the score, the trivia controller and the seeded RNG,
//! so a fresh one can be built per test and replayed deterministically.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::score::Score;
use super::stats::MatchStats;
use super::trivia::{AnswerResult, TriviaController};
use crate::consts::*;
use crate::error::SetupError;
use crate::questions::QuestionBank;
use crate::tuning::Tuning;

/// Current phase of play. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Title screen, waiting for start input
    Title,
    /// Short pause before the server launches the ball
    Serving,
    /// Ball travelling toward the CPU
    BallToCpu,
    /// Ball travelling toward the player
    BallToPlayer,
    /// Physics frozen, trivia question on screen
    QuestionTime,
    /// Point decided, brief frozen pause
    PointScored,
    /// Match decided
    GameOver,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Title => "TITLE",
            GameState::Serving => "SERVING",
            GameState::BallToCpu => "BALL_TO_CPU",
            GameState::BallToPlayer => "BALL_TO_PLAYER",
            GameState::QuestionTime => "QUESTION_TIME",
            GameState::PointScored => "POINT_SCORED",
            GameState::GameOver => "GAME_OVER",
        }
    }

    /// Ball in play
    pub fn is_rally(&self) -> bool {
        matches!(self, GameState::BallToCpu | GameState::BallToPlayer)
    }

    /// Rally state for a ball heading to `receiver`
    pub fn toward(receiver: Side) -> Self {
        match receiver {
            Side::Player => GameState::BallToPlayer,
            Side::Cpu => GameState::BallToCpu,
        }
    }
}

/// One of the two competitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Cpu,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Cpu,
            Side::Cpu => Side::Player,
        }
    }

    /// x of this side's racket plane
    pub fn racket_x(self) -> f32 {
        match self {
            Side::Player => PLAYER_RACKET_X,
            Side::Cpu => CPU_RACKET_X,
        }
    }

    /// Sign of x velocity for a ball travelling toward this side
    pub fn incoming_sign(self) -> f32 {
        match self {
            Side::Player => -1.0,
            Side::Cpu => 1.0,
        }
    }
}

/// The ball. x runs along the court, y across it, z is height.
#[derive(Debug, Clone, Serialize)]
pub struct Ball {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Side that last struck the ball
    pub hitter: Side,
    /// Bounces since the last strike
    pub bounces: u8,
    /// Returns in the current rally (serve excluded)
    pub returns: u32,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            pos: Vec3::new(PLAYER_RACKET_X, COURT_WIDTH / 2.0, SERVE_HEIGHT),
            vel: Vec3::ZERO,
            hitter: Side::Player,
            bounces: 0,
            returns: 0,
        }
    }

    /// Park the ball on the server's racket
    pub fn reset_for_serve(&mut self, server: Side, racket_y: f32) {
        self.pos = Vec3::new(server.racket_x(), racket_y, SERVE_HEIGHT);
        self.vel = Vec3::ZERO;
        self.hitter = server;
        self.bounces = 0;
        self.returns = 0;
    }

    /// Side the ball is travelling toward
    pub fn receiver(&self) -> Side {
        self.hitter.other()
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// A racket. It slides across the court on its side's hit plane.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Racket {
    pub side: Side,
    pub y: f32,
}

impl Racket {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            y: COURT_WIDTH / 2.0,
        }
    }

    pub fn x(&self) -> f32 {
        self.side.racket_x()
    }

    pub fn recenter(&mut self) {
        self.y = COURT_WIDTH / 2.0;
    }

    /// Whether a ball at lateral position `y` and height `z` is within reach
    pub fn reaches(&self, y: f32, z: f32) -> bool {
        (y - self.y).abs() <= RACKET_REACH && z <= RACKET_REACH_HEIGHT
    }
}

/// Why a point ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointReason {
    /// Shot failed to clear the net
    Net,
    /// Shot landed outside the receiver's court
    Out,
    /// Receiver let a good ball get past
    Missed,
    /// Ball bounced twice before the receiver struck it
    DoubleBounce,
    /// Decided by a trivia answer
    Trivia(AnswerResult),
}

/// Last decided point, kept for the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointRecord {
    pub winner: Side,
    pub reason: PointReason,
}

/// Outcome of the last resolved question, kept for on-screen feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReveal {
    pub question_index: usize,
    pub selected: Option<usize>,
    pub correct_index: usize,
    /// Text of the correct choice, revealed once resolved
    pub correct_text: &'static str,
    pub result: AnswerResult,
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub bank: QuestionBank,
    pub state: GameState,
    pub ball: Ball,
    pub player: Racket,
    pub cpu: Racket,
    /// Latest player racket position written by the input layer
    pub player_target: f32,
    pub score: Score,
    pub trivia: TriviaController,
    pub stats: MatchStats,
    /// Seconds left in a timed phase (Serving, PointScored)
    pub phase_timer: f32,
    pub last_point: Option<PointRecord>,
    pub last_answer: Option<AnswerReveal>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Score the first match opens from (set by `with_score`)
    opening_score: Option<Score>,
    pub(crate) rng: Pcg32,
}

impl Simulation {
    /// Create a simulation at the title screen
    pub fn new(seed: u64, tuning: Tuning, bank: QuestionBank) -> Result<Self, SetupError> {
        tuning.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let trivia = TriviaController::new(bank.len(), &mut rng);

        Ok(Self {
            seed,
            tuning,
            bank,
            state: GameState::Title,
            ball: Ball::new(),
            player: Racket::new(Side::Player),
            cpu: Racket::new(Side::Cpu),
            player_target: COURT_WIDTH / 2.0,
            score: Score::default(),
            trivia,
            stats: MatchStats::default(),
            phase_timer: 0.0,
            last_point: None,
            last_answer: None,
            time_ticks: 0,
            opening_score: None,
            rng,
        })
    }

    /// Default tuning and the built-in question bank
    pub fn with_builtin_bank(seed: u64) -> Result<Self, SetupError> {
        Self::new(seed, Tuning::default(), QuestionBank::builtin()?)
    }

    /// Create a simulation that resumes from a given score
    pub fn with_score(
        seed: u64,
        tuning: Tuning,
        bank: QuestionBank,
        score: Score,
    ) -> Result<Self, SetupError> {
        score.validate()?;
        let mut sim = Self::new(seed, tuning, bank)?;
        sim.score = score.clone();
        sim.opening_score = Some(score);
        Ok(sim)
    }

    /// Input slot: desired lateral position of the player's racket
    pub fn set_player_target(&mut self, y: f32) {
        if y.is_finite() {
            self.player_target = crate::clamp_lateral(y);
        }
    }

    /// Leave the title screen and begin the first serve. The first match
    /// opens from the `with_score` score, later ones from love all.
    pub fn start(&mut self) {
        if self.state != GameState::Title {
            return;
        }
        self.score = self.opening_score.take().unwrap_or_default();
        self.stats = MatchStats::default();
        self.last_point = None;
        self.last_answer = None;
        self.begin_serve();
        log::info!("Match started (seed {})", self.seed);
    }

    /// Return to the title screen after a finished match
    pub fn restart(&mut self) {
        if self.state != GameState::GameOver {
            return;
        }
        self.state = GameState::Title;
        self.score = Score::default();
        self.stats = MatchStats::default();
        self.last_point = None;
        self.last_answer = None;
        self.trivia.abandon();
        self.ball = Ball::new();
        self.cpu.recenter();
        log::info!("Back to title");
    }

    /// Enter SERVING: rackets repositioned, ball parked on the server
    pub(crate) fn begin_serve(&mut self) {
        self.state = GameState::Serving;
        self.phase_timer = SERVE_DELAY;
        self.cpu.recenter();
        let server = self.score.server;
        let racket_y = self.racket(server).y;
        self.ball.reset_for_serve(server, racket_y);
    }

    pub fn racket(&self, side: Side) -> &Racket {
        match side {
            Side::Player => &self.player,
            Side::Cpu => &self.cpu,
        }
    }

    /// Winner once the match is decided
    pub fn winner(&self) -> Option<Side> {
        self.score.match_winner()
    }
}
