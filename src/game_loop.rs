//! Frame-driven game loop
//!
//! Turns variable display frame durations into fixed `SIM_DT` ticks. Input
//! handlers write into the pending `TickInput`; one-shot inputs are cleared
//! after the tick that consumes them.

use crate::consts::*;
use crate::error::SetupError;
use crate::questions::QuestionBank;
use crate::sim::{GameState, Simulation, Snapshot, TickInput, tick};
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct GameLoop {
    sim: Simulation,
    accumulator: f32,
    input: TickInput,
    /// Timestamp of the previous frame (ms)
    last_time: Option<f64>,
}

impl GameLoop {
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, SetupError> {
        let bank = QuestionBank::builtin()?;
        Ok(Self::from_sim(Simulation::new(seed, tuning, bank)?))
    }

    pub fn from_sim(sim: Simulation) -> Self {
        Self {
            sim,
            accumulator: 0.0,
            input: TickInput::default(),
            last_time: None,
        }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn state(&self) -> GameState {
        self.sim.state
    }

    /// Pointer/keyboard position for the player's racket
    pub fn set_player_target(&mut self, y: f32) {
        self.input.target_y = Some(y);
    }

    pub fn press_start(&mut self) {
        self.input.start = true;
    }

    pub fn answer(&mut self, choice: usize) {
        self.input.answer = Some(choice);
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    /// Advance to the frame timestamp `now_ms`. Returns ticks run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.advance(dt)
    }

    /// Run simulation ticks for `dt` seconds of wall time
    pub fn advance(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.sim, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.start = false;
            self.input.answer = None;
            self.input.restart = false;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog past the substep cap
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_sim(&self.sim)
    }
}
