//! Match statistics shown on the scoreboard panel

use serde::Serialize;

use super::state::Side;
use super::trivia::AnswerResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub questions_asked: u32,
    pub answered_correct: u32,
    pub answered_wrong: u32,
    pub timed_out: u32,
    /// Points played, whichever way they ended
    pub rallies: u32,
    /// Most returns in a single rally
    pub longest_rally: u32,
    pub player_points_won: u32,
    pub cpu_points_won: u32,
}

impl MatchStats {
    pub fn record_question_asked(&mut self) {
        self.questions_asked += 1;
    }

    pub fn record_answer(&mut self, result: AnswerResult) {
        match result {
            AnswerResult::Correct => self.answered_correct += 1,
            AnswerResult::Incorrect => self.answered_wrong += 1,
            AnswerResult::TimedOut => self.timed_out += 1,
        }
    }

    /// Close out a point that ran for `returns` returns
    pub fn record_point(&mut self, winner: Side, returns: u32) {
        self.rallies += 1;
        self.longest_rally = self.longest_rally.max(returns);
        match winner {
            Side::Player => self.player_points_won += 1,
            Side::Cpu => self.cpu_points_won += 1,
        }
    }

    /// Share of resolved questions answered correctly (0 when none yet)
    pub fn accuracy(&self) -> f32 {
        let resolved = self.answered_correct + self.answered_wrong + self.timed_out;
        if resolved == 0 {
            0.0
        } else {
            self.answered_correct as f32 / resolved as f32
        }
    }
}
