//! Fixed timestep simulation tick
//!
//! The state machine: one call advances the match by one step. Every
//! transition applies its side effects (score, timers, rackets) before the
//! call returns, so a snapshot never sees a half-applied change.

use rand::Rng;

use super::cpu::{predict_crossing, update_cpu};
use super::physics::{RallyEvent, return_ball, serve_ball, update_ball};
use super::score::Award;
use super::state::{AnswerReveal, GameState, PointReason, PointRecord, Side, Simulation};
use super::trivia::AnswerResult;
use crate::consts::*;

/// Idle mode answers after this long on a question
const IDLE_ANSWER_DELAY: f32 = 1.0;
/// Chance the idle player picks the right answer
const IDLE_ACCURACY: f64 = 0.7;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired lateral racket position (pointer/keyboard)
    pub target_y: Option<f32>,
    /// Leave the title screen
    pub start: bool,
    /// Answer choice during QUESTION_TIME
    pub answer: Option<usize>,
    /// Back to title after the match
    pub restart: bool,
    /// Idle/demo mode - AI plays the player's side
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) {
    // Dropped or stalled frames are not errors
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    sim.time_ticks += 1;

    let mut input = input.clone();
    if input.idle_mode {
        drive_idle(sim, &mut input);
    }

    if let Some(y) = input.target_y {
        sim.set_player_target(y);
    }
    // Physics is frozen while a question is up
    if sim.state != GameState::QuestionTime {
        sim.player.y = sim.player_target;
    }

    match sim.state {
        GameState::Title => {
            if input.start {
                sim.start();
            }
        }
        GameState::Serving => {
            sim.phase_timer -= dt;
            if sim.phase_timer <= 0.0 {
                serve(sim);
                offer_interrupt(sim);
            }
        }
        GameState::BallToCpu | GameState::BallToPlayer => update_rally(sim, dt),
        GameState::QuestionTime => {
            let answered = input
                .answer
                .is_some_and(|choice| sim.trivia.handle_answer(choice, &sim.bank).is_some());
            if !answered {
                sim.trivia.tick(dt);
            }
            resolve_question(sim);
        }
        GameState::PointScored => {
            sim.phase_timer -= dt;
            if sim.phase_timer <= 0.0 {
                if sim.score.is_match_over() {
                    enter_game_over(sim);
                } else {
                    sim.begin_serve();
                }
            }
        }
        GameState::GameOver => {
            if input.restart {
                sim.restart();
            }
        }
    }
}

impl Simulation {
    /// Answer the open question. Ignored outside QUESTION_TIME and after the
    /// first answer; resolves the point in the same call.
    pub fn handle_answer(&mut self, choice: usize) -> Option<AnswerResult> {
        if self.state != GameState::QuestionTime {
            return None;
        }
        let result = self.trivia.handle_answer(choice, &self.bank)?;
        resolve_question(self);
        Some(result)
    }
}

/// Launch the ball from the current server
fn serve(sim: &mut Simulation) {
    let server = sim.score.server;
    let racket = *sim.racket(server);
    sim.state = serve_ball(&mut sim.ball, server, &racket, &sim.tuning, &mut sim.rng);
}

/// Give the trivia controller a chance to arm an interrupt
fn offer_interrupt(sim: &mut Simulation) {
    if sim.trivia.offer(sim.tuning.question_chance, &mut sim.rng) {
        log::debug!("Question incoming (tick {})", sim.time_ticks);
    }
}

fn update_rally(sim: &mut Simulation, dt: f32) {
    let armed = sim.trivia.is_armed();
    let time_scale = if armed {
        sim.tuning.slow_motion_factor
    } else {
        1.0
    };

    update_cpu(
        &mut sim.cpu,
        &sim.ball,
        sim.state,
        sim.tuning.cpu_skill,
        dt * time_scale,
        &mut sim.rng,
    );
    let event = update_ball(&mut sim.ball, &sim.player, &sim.cpu, dt, time_scale);

    if armed {
        let eased = sim.trivia.advance_ease_in(dt);
        let point_over = matches!(event, RallyEvent::PointOver { .. });
        // A point ending mid ease-in is decided by the question instead
        if (eased || point_over) && open_question(sim) {
            return;
        }
    }

    match event {
        RallyEvent::Contact { by } => {
            let racket = *sim.racket(by);
            return_ball(&mut sim.ball, &racket, &sim.tuning, &mut sim.rng);
            sim.state = GameState::toward(by.other());
            if by == Side::Cpu {
                offer_interrupt(sim);
            }
        }
        RallyEvent::PointOver { winner, reason } => {
            log::debug!("{:?} wins the rally ({:?})", winner, reason);
            award(sim, winner, reason);
            sim.state = GameState::PointScored;
            sim.phase_timer = POINT_PAUSE;
        }
        RallyEvent::InFlight | RallyEvent::Bounced => {}
    }
}

/// Freeze play on the next question. False if the bank gave nothing.
fn open_question(sim: &mut Simulation) -> bool {
    let Some(index) = sim.trivia.open(sim.tuning.question_time_limit, &mut sim.rng) else {
        return false;
    };
    sim.state = GameState::QuestionTime;
    sim.stats.record_question_asked();
    if let Some(question) = sim.bank.get(index) {
        log::info!("Question time: [{}] {}", question.category, question.question);
    }
    true
}

/// Close a resolved session: award the point, then resume or end the match
fn resolve_question(sim: &mut Simulation) {
    let Some(session) = sim.trivia.take_resolved() else {
        return;
    };
    let Some(result) = session.result else {
        return;
    };
    let (correct_index, correct_text) = sim
        .bank
        .get(session.question_index)
        .map_or((0, ""), |q| (q.answer_index, q.answer_text()));
    sim.last_answer = Some(AnswerReveal {
        question_index: session.question_index,
        selected: session.selected,
        correct_index,
        correct_text,
        result,
    });
    sim.stats.record_answer(result);
    log::info!("Answer {:?} (correct: {})", result, correct_text);

    let outcome = award(sim, result.point_winner(), PointReason::Trivia(result));
    if outcome.match_winner().is_some() {
        enter_game_over(sim);
        return;
    }

    // Resume from the serving side; not an interrupt opportunity
    sim.cpu.recenter();
    serve(sim);
}

/// Apply a decided point to the score and stats
fn award(sim: &mut Simulation, winner: Side, reason: PointReason) -> Award {
    let (score, outcome) = sim.score.award_point(winner);
    sim.score = score;
    sim.stats.record_point(winner, sim.ball.returns);
    sim.last_point = Some(PointRecord { winner, reason });

    match outcome {
        Award::Point => {}
        Award::Game(side) => log::info!(
            "Game {:?} ({}-{})",
            side,
            sim.score.player_games,
            sim.score.cpu_games
        ),
        Award::Set(side) => log::info!(
            "Set {:?} (sets {}-{})",
            side,
            sim.score.player_sets,
            sim.score.cpu_sets
        ),
        Award::Match(side) => log::info!(
            "Match {:?} (sets {}-{})",
            side,
            sim.score.player_sets,
            sim.score.cpu_sets
        ),
    }
    outcome
}

fn enter_game_over(sim: &mut Simulation) {
    sim.state = GameState::GameOver;
    sim.trivia.abandon();
    log::info!(
        "Game over: {:?} wins after {} points",
        sim.winner(),
        sim.stats.rallies
    );
}

/// Demo AI for the player's side
fn drive_idle(sim: &mut Simulation, input: &mut TickInput) {
    match sim.state {
        GameState::Title => input.start = true,
        GameState::BallToPlayer => {
            // Vary the hit point so returns are not all down the middle
            let spread = ((sim.ball.returns % 5) as f32 - 2.0) * 0.25 * RACKET_REACH;
            input.target_y = Some(predict_crossing(&sim.ball, PLAYER_RACKET_X) + spread);
        }
        GameState::Serving | GameState::BallToCpu | GameState::PointScored => {
            input.target_y = Some(COURT_WIDTH / 2.0);
        }
        GameState::QuestionTime => {
            let Some(session) = sim.trivia.session() else {
                return;
            };
            if session.time_limit - session.remaining < IDLE_ANSWER_DELAY {
                return;
            }
            let Some(correct) = sim.bank.get(session.question_index).map(|q| q.answer_index)
            else {
                return;
            };
            let choice = if sim.rng.random_bool(IDLE_ACCURACY) {
                correct
            } else {
                (correct + sim.rng.random_range(1..4)) % 4
            };
            input.answer = Some(choice);
        }
        GameState::GameOver => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QuestionBank;
    use crate::sim::score::{PointScore, PointValue, Score};
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn sim_with(chance: f32, time_limit: f32, seed: u64) -> Simulation {
        let tuning = Tuning {
            question_chance: chance,
            question_time_limit: time_limit,
            ..Default::default()
        };
        Simulation::new(seed, tuning, QuestionBank::builtin().unwrap()).unwrap()
    }

    fn sim_from_score(score: Score, seed: u64) -> Simulation {
        let tuning = Tuning {
            question_chance: 0.0,
            ..Default::default()
        };
        Simulation::with_score(seed, tuning, QuestionBank::builtin().unwrap(), score).unwrap()
    }

    fn start_input() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    /// Tick until `done` holds, failing after `limit` ticks
    fn run_until(sim: &mut Simulation, limit: u32, done: impl Fn(&Simulation) -> bool) {
        let input = TickInput::default();
        for _ in 0..limit {
            if done(sim) {
                return;
            }
            tick(sim, &input, SIM_DT);
        }
        assert!(done(sim), "condition not reached, state {:?}", sim.state);
    }

    /// Replace the ball in play with a low shot from `hitter` into the net
    fn force_net_fault(sim: &mut Simulation, hitter: Side) {
        let (x, vx) = match hitter {
            Side::Player => (NET_X - 30.0, 400.0),
            Side::Cpu => (NET_X + 30.0, -400.0),
        };
        sim.ball.pos = Vec3::new(x, COURT_WIDTH / 2.0, 5.0);
        sim.ball.vel = Vec3::new(vx, 0.0, 0.0);
        sim.ball.hitter = hitter;
        sim.ball.bounces = 0;
        sim.state = GameState::toward(hitter.other());
    }

    /// Play one point that `winner` takes off the opponent's net fault
    fn play_fault_point(sim: &mut Simulation, winner: Side) {
        run_until(sim, 1000, |s| s.state.is_rally());
        force_net_fault(sim, winner.other());
        run_until(sim, 100, |s| s.state == GameState::PointScored);
        assert_eq!(sim.last_point.map(|p| p.winner), Some(winner));
        run_until(sim, 1000, |s| {
            matches!(s.state, GameState::Serving | GameState::GameOver)
        });
    }

    #[test]
    fn test_tick_title_to_serve_to_rally() {
        let mut sim = sim_with(0.0, 10.0, 12345);
        tick(&mut sim, &TickInput::default(), SIM_DT);
        assert_eq!(sim.state, GameState::Title);

        tick(&mut sim, &start_input(), SIM_DT);
        assert_eq!(sim.state, GameState::Serving);

        run_until(&mut sim, 1000, |s| s.state != GameState::Serving);
        // Player serves first
        assert_eq!(sim.state, GameState::BallToCpu);
        assert!(sim.ball.vel.x > 0.0);
    }

    #[test]
    fn test_cpu_wins_four_straight_points() {
        let mut sim = sim_with(0.0, 10.0, 7);
        tick(&mut sim, &start_input(), SIM_DT);
        for _ in 0..4 {
            play_fault_point(&mut sim, Side::Cpu);
        }
        assert_eq!(sim.score.cpu_games, 1);
        assert_eq!(sim.score.player_games, 0);
        assert_eq!(sim.score.points(Side::Player), PointScore::LOVE);
        assert_eq!(sim.score.points(Side::Cpu), PointScore::LOVE);
        assert_eq!(sim.state, GameState::Serving);
        assert_eq!(sim.stats.cpu_points_won, 4);
    }

    #[test]
    fn test_tiebreak_at_six_all() {
        let score = Score {
            player_games: 6,
            cpu_games: 5,
            cpu_points: PointScore::Points(PointValue::Forty),
            ..Score::default()
        };
        let mut sim = sim_from_score(score, 3);
        tick(&mut sim, &start_input(), SIM_DT);

        play_fault_point(&mut sim, Side::Cpu);
        assert!(sim.score.tiebreak);
        assert_eq!(sim.score.points(Side::Cpu), PointScore::TiebreakPoints(0));

        for _ in 0..6 {
            play_fault_point(&mut sim, Side::Cpu);
            assert!(sim.score.tiebreak);
        }
        play_fault_point(&mut sim, Side::Cpu);
        assert!(!sim.score.tiebreak);
        assert_eq!(sim.score.cpu_sets, 1);
        let set = sim.score.completed_sets[0];
        assert_eq!((set.player_games, set.cpu_games), (6, 7));
        assert_eq!(set.tiebreak, Some((0, 7)));
    }

    #[test]
    fn test_question_chance_zero_never_interrupts() {
        let mut sim = sim_with(0.0, 10.0, 99);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..20_000 {
            tick(&mut sim, &input, SIM_DT);
            assert_ne!(sim.state, GameState::QuestionTime);
        }
        assert_eq!(sim.stats.questions_asked, 0);
        assert!(sim.stats.rallies > 0);
    }

    #[test]
    fn test_question_chance_one_interrupts_serve() {
        let mut sim = sim_with(1.0, 10.0, 5);
        tick(&mut sim, &start_input(), SIM_DT);
        run_until(&mut sim, 1000, |s| s.state.is_rally());
        assert!(sim.trivia.is_armed());

        run_until(&mut sim, 1000, |s| s.state == GameState::QuestionTime);
        assert_eq!(sim.stats.questions_asked, 1);
        let ball = sim.ball.pos;
        let cpu = sim.cpu.y;

        // Frozen while the question is up, but the timer runs
        let input = TickInput {
            target_y: Some(0.0),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut sim, &input, SIM_DT);
        }
        assert_eq!(sim.ball.pos, ball);
        assert_eq!(sim.cpu.y, cpu);
        assert!(sim.trivia.session().unwrap().remaining < 10.0);
    }

    #[test]
    fn test_correct_answer_wins_point_and_resumes() {
        let mut sim = sim_with(1.0, 10.0, 5);
        tick(&mut sim, &start_input(), SIM_DT);
        run_until(&mut sim, 2000, |s| s.state == GameState::QuestionTime);

        let index = sim.trivia.session().unwrap().question_index;
        let correct = sim.bank.get(index).unwrap().answer_index;
        assert_eq!(sim.handle_answer(correct), Some(AnswerResult::Correct));

        assert_eq!(
            sim.score.points(Side::Player),
            PointScore::Points(PointValue::Fifteen)
        );
        assert_eq!(sim.state, GameState::BallToCpu);
        // The resume serve is not an opportunity
        assert!(!sim.trivia.is_armed());
        let reveal = sim.last_answer.unwrap();
        assert_eq!(reveal.selected, Some(correct));
        assert_eq!(reveal.correct_index, correct);
        assert_eq!(reveal.correct_text, sim.bank.get(index).unwrap().choices[correct]);

        // Late answers are ignored
        assert_eq!(sim.handle_answer(correct), None);
    }

    #[test]
    fn test_answer_via_tick_input() {
        let mut sim = sim_with(1.0, 10.0, 11);
        tick(&mut sim, &start_input(), SIM_DT);
        run_until(&mut sim, 2000, |s| s.state == GameState::QuestionTime);

        let index = sim.trivia.session().unwrap().question_index;
        let wrong = (sim.bank.get(index).unwrap().answer_index + 1) % 4;
        let input = TickInput {
            answer: Some(wrong),
            ..Default::default()
        };
        tick(&mut sim, &input, SIM_DT);
        assert_eq!(
            sim.score.points(Side::Cpu),
            PointScore::Points(PointValue::Fifteen)
        );
        assert_eq!(sim.stats.answered_wrong, 1);
    }

    #[test]
    fn test_question_timeout_awards_cpu() {
        let mut sim = sim_with(1.0, 1.0, 21);
        tick(&mut sim, &start_input(), SIM_DT);
        run_until(&mut sim, 2000, |s| s.state == GameState::QuestionTime);

        run_until(&mut sim, 200, |s| s.last_answer.is_some());
        let reveal = sim.last_answer.unwrap();
        assert_eq!(reveal.result, AnswerResult::TimedOut);
        assert_eq!(reveal.selected, None);
        assert_eq!(
            sim.last_point,
            Some(PointRecord {
                winner: Side::Cpu,
                reason: PointReason::Trivia(AnswerResult::TimedOut),
            })
        );
        assert_eq!(
            sim.score.points(Side::Cpu),
            PointScore::Points(PointValue::Fifteen)
        );
        assert_eq!(sim.score.points(Side::Player), PointScore::LOVE);
        assert_eq!(sim.stats.timed_out, 1);
        assert!(sim.state.is_rally());
    }

    #[test]
    fn test_match_point_ends_game_and_restart() {
        let score = Score {
            player_sets: 1,
            set_index: 1,
            player_games: 5,
            player_points: PointScore::Points(PointValue::Forty),
            ..Score::default()
        };
        let mut sim = sim_from_score(score, 8);
        tick(&mut sim, &start_input(), SIM_DT);

        play_fault_point(&mut sim, Side::Player);
        assert_eq!(sim.state, GameState::GameOver);
        assert_eq!(sim.winner(), Some(Side::Player));

        // Start does nothing here, restart returns to title
        tick(&mut sim, &start_input(), SIM_DT);
        assert_eq!(sim.state, GameState::GameOver);
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut sim, &restart, SIM_DT);
        assert_eq!(sim.state, GameState::Title);
        assert_eq!(sim.score, Score::default());
    }

    #[test]
    fn test_idle_match_finishes() {
        let mut sim = sim_with(QUESTION_CHANCE, QUESTION_TIME_LIMIT, 2024);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..2_000_000 {
            tick(&mut sim, &input, SIM_DT);
            if sim.state == GameState::GameOver {
                break;
            }
        }
        assert_eq!(sim.state, GameState::GameOver);
        assert!(sim.winner().is_some());
        assert!(sim.score.validate().is_ok());
        assert!(sim.stats.questions_asked > 0);
    }

    #[test]
    fn test_determinism() {
        let mut sim1 = sim_with(QUESTION_CHANCE, QUESTION_TIME_LIMIT, 99999);
        let mut sim2 = sim_with(QUESTION_CHANCE, QUESTION_TIME_LIMIT, 99999);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..5000 {
            tick(&mut sim1, &input, SIM_DT);
            tick(&mut sim2, &input, SIM_DT);
        }

        assert_eq!(sim1.time_ticks, sim2.time_ticks);
        assert_eq!(sim1.state, sim2.state);
        assert_eq!(sim1.score, sim2.score);
        assert_eq!(sim1.stats, sim2.stats);
        assert_eq!(sim1.ball.pos, sim2.ball.pos);
        assert!((sim1.cpu.y - sim2.cpu.y).abs() < 0.0001);
    }

    #[test]
    fn test_bad_frame_durations() {
        let mut sim = sim_with(0.0, 10.0, 4);
        tick(&mut sim, &start_input(), SIM_DT);
        for dt in [f32::NAN, f32::INFINITY, -1.0, 0.0, 10.0] {
            tick(&mut sim, &TickInput::default(), dt);
            assert!(sim.ball.pos.is_finite());
            assert!(sim.phase_timer.is_finite());
        }
    }
}
