//! Read-only view of the simulation for drawing routines
//!
//! Everything is already projected to canvas pixels. The answer to an open
//! question is withheld until the session resolves.

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::physics::project_to_screen;
use super::score::SetResult;
use super::state::{AnswerReveal, GameState, PointRecord, Side, Simulation};
use super::stats::MatchStats;
use crate::consts::*;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: GameState,
    pub ball: BallView,
    pub player_racket: RacketView,
    pub cpu_racket: RacketView,
    pub score: ScoreView,
    pub question: Option<QuestionView>,
    pub last_answer: Option<AnswerReveal>,
    pub last_point: Option<PointRecord>,
    pub stats: MatchStats,
    pub winner: Option<Side>,
    /// Questions still to come before the draw order reshuffles
    pub questions_left_in_cycle: usize,
    /// Completed passes through the question bank
    pub question_cycles: u32,
}

/// Colors the drawing routines paint with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub court: &'static str,
    pub line: &'static str,
    pub net: &'static str,
    pub ball: &'static str,
    pub player: &'static str,
    pub cpu: &'static str,
    pub scoreboard: &'static str,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        court: COURT_COLOR,
        line: LINE_COLOR,
        net: NET_COLOR,
        ball: BALL_COLOR,
        player: PLAYER_COLOR,
        cpu: CPU_COLOR,
        scoreboard: SCOREBOARD_COLOR,
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallView {
    pub screen: Vec2,
    /// Ground shadow under the ball
    pub shadow: Vec2,
    pub radius: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RacketView {
    pub screen: Vec2,
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    /// Point labels: "0", "15", "30", "40", "AD" or tiebreak numerals
    pub player_points: String,
    pub cpu_points: String,
    pub player_games: u8,
    pub cpu_games: u8,
    pub player_sets: u8,
    pub cpu_sets: u8,
    pub set_index: u8,
    pub tiebreak: bool,
    pub server: Side,
    pub completed_sets: Vec<SetResult>,
}

/// The open question as shown to the player
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub category: &'static str,
    pub question: &'static str,
    pub choices: [&'static str; 4],
    pub remaining: f32,
    pub time_limit: f32,
    pub selected: Option<usize>,
}

impl Snapshot {
    pub fn from_sim(sim: &Simulation) -> Self {
        let ball = project_to_screen(sim.ball.pos);
        let shadow = project_to_screen(Vec3::new(sim.ball.pos.x, sim.ball.pos.y, 0.0));
        let visible = !matches!(sim.state, GameState::Title | GameState::GameOver);

        let racket_view = |side: Side| {
            let racket = sim.racket(side);
            let projected = project_to_screen(Vec3::new(racket.x(), racket.y, 0.0));
            RacketView {
                screen: projected.point,
                scale: projected.scale,
            }
        };

        let (player_points, cpu_points) = sim.score.point_labels();
        let score = ScoreView {
            player_points,
            cpu_points,
            player_games: sim.score.player_games,
            cpu_games: sim.score.cpu_games,
            player_sets: sim.score.player_sets,
            cpu_sets: sim.score.cpu_sets,
            set_index: sim.score.set_index,
            tiebreak: sim.score.tiebreak,
            server: sim.score.server,
            completed_sets: sim.score.completed_sets.clone(),
        };

        let question = sim.trivia.session().and_then(|session| {
            let q = sim.bank.get(session.question_index)?;
            Some(QuestionView {
                category: q.category.as_str(),
                question: q.question,
                choices: q.choices,
                remaining: session.remaining,
                time_limit: session.time_limit,
                selected: session.selected,
            })
        });

        Self {
            state: sim.state,
            ball: BallView {
                screen: ball.point,
                shadow: shadow.point,
                radius: BALL_RADIUS * ball.scale,
                visible,
            },
            player_racket: racket_view(Side::Player),
            cpu_racket: racket_view(Side::Cpu),
            score,
            question,
            last_answer: sim.last_answer,
            last_point: sim.last_point,
            stats: sim.stats.clone(),
            winner: sim.winner(),
            questions_left_in_cycle: sim.trivia.remaining_in_cycle(),
            question_cycles: sim.trivia.draw_cycles(),
        }
    }
}
