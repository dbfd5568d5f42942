//! Trivia interrupt controller
//!
//! At each opportunity the state machine offers, a uniform roll below
//! `question_chance` arms an interrupt. The ball then eases in at slow motion
//! before the question opens. A session accepts exactly one answer; timing
//! out counts the same as a wrong answer.
//!
//! Reward mapping (symmetric): a correct answer wins the current point for the
//! player, a wrong answer or a timeout gives it to the CPU.

use rand::Rng;
use serde::Serialize;

use super::state::Side;
use crate::consts::QUESTION_EASE_IN;
use crate::questions::{DrawOrder, QuestionBank};

/// How a question session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerResult {
    Correct,
    Incorrect,
    TimedOut,
}

impl AnswerResult {
    /// Side awarded the current point
    pub fn point_winner(self) -> Side {
        match self {
            AnswerResult::Correct => Side::Player,
            AnswerResult::Incorrect | AnswerResult::TimedOut => Side::Cpu,
        }
    }
}

/// The question currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSession {
    /// Index into the question bank
    pub question_index: usize,
    /// Seconds left to answer
    pub remaining: f32,
    pub time_limit: f32,
    /// Choice the player picked, once answered
    pub selected: Option<usize>,
    pub result: Option<AnswerResult>,
}

impl QuestionSession {
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct TriviaController {
    draw: DrawOrder,
    session: Option<QuestionSession>,
    /// Seconds of slow motion left before an armed interrupt opens
    ease_in: Option<f32>,
}

impl TriviaController {
    pub fn new<R: Rng>(bank_len: usize, rng: &mut R) -> Self {
        Self {
            draw: DrawOrder::new(bank_len, rng),
            session: None,
            ease_in: None,
        }
    }

    /// Roll for an interrupt. Returns true when one was armed.
    pub fn offer<R: Rng>(&mut self, chance: f32, rng: &mut R) -> bool {
        if self.ease_in.is_some() || self.session.is_some() {
            return false;
        }
        let roll: f32 = rng.random();
        if roll < chance {
            self.ease_in = Some(QUESTION_EASE_IN);
            log::debug!("Trivia interrupt armed (roll {:.3} < {:.3})", roll, chance);
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.ease_in.is_some()
    }

    /// Run down the ease-in; true once the question should open
    pub fn advance_ease_in(&mut self, dt: f32) -> bool {
        match self.ease_in.as_mut() {
            Some(left) => {
                *left -= dt;
                *left <= 0.0
            }
            None => false,
        }
    }

    /// Pop the next question from the draw order and start its countdown
    pub fn open<R: Rng>(&mut self, time_limit: f32, rng: &mut R) -> Option<usize> {
        self.ease_in = None;
        let question_index = self.draw.next(rng)?;
        self.session = Some(QuestionSession {
            question_index,
            remaining: time_limit,
            time_limit,
            selected: None,
            result: None,
        });
        Some(question_index)
    }

    pub fn session(&self) -> Option<&QuestionSession> {
        self.session.as_ref()
    }

    /// Count the timer down. Returns `TimedOut` on the tick it expires.
    pub fn tick(&mut self, dt: f32) -> Option<AnswerResult> {
        let session = self.session.as_mut()?;
        if session.is_resolved() {
            return None;
        }
        session.remaining = (session.remaining - dt).max(0.0);
        if session.remaining <= 0.0 {
            session.result = Some(AnswerResult::TimedOut);
            return session.result;
        }
        None
    }

    /// Record the player's choice. Only the first valid answer counts.
    pub fn handle_answer(&mut self, choice: usize, bank: &QuestionBank) -> Option<AnswerResult> {
        let session = self.session.as_mut()?;
        if session.is_resolved() {
            return None;
        }
        if choice > 3 {
            log::warn!("Ignoring answer index {} (choices are 0-3)", choice);
            return None;
        }
        let question = bank.get(session.question_index)?;
        let result = if choice == question.answer_index {
            AnswerResult::Correct
        } else {
            AnswerResult::Incorrect
        };
        session.selected = Some(choice);
        session.result = Some(result);
        Some(result)
    }

    /// Remove a resolved session
    pub fn take_resolved(&mut self) -> Option<QuestionSession> {
        if self.session.as_ref().is_some_and(QuestionSession::is_resolved) {
            self.session.take()
        } else {
            None
        }
    }

    /// Drop any armed interrupt or open session (match reset)
    pub fn abandon(&mut self) {
        self.ease_in = None;
        self.session = None;
    }

    /// Questions left before the draw order reshuffles
    pub fn remaining_in_cycle(&self) -> usize {
        self.draw.remaining()
    }

    /// Completed passes through the bank
    pub fn draw_cycles(&self) -> u32 {
        self.draw.cycles()
    }
}
