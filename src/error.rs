//! Construction-time error types
//!
//! The simulation has no I/O, so the only failures are broken invariants in
//! the question bank, the tunables or a supplied score. All of them are
//! reported before a match starts; nothing here is raised mid-play.

use thiserror::Error;

use crate::questions::Category;

/// A question bank that cannot be played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("question {index} has empty text")]
    EmptyQuestion { index: usize },

    #[error("question {index} choice {choice} is empty")]
    EmptyChoice { index: usize, choice: usize },

    #[error("question {index} answer index {answer} is outside 0..=3")]
    AnswerOutOfRange { index: usize, answer: usize },

    #[error("question {index} repeats choice text {text:?}")]
    DuplicateChoice { index: usize, text: String },

    #[error("question {index} duplicates the text of question {first}")]
    DuplicateQuestion { index: usize, first: usize },

    #[error("bank holds {found} questions, need at least {required}")]
    TooFewQuestions { found: usize, required: usize },

    #[error("category {category} holds {found} questions, need at least {required}")]
    CategoryShortfall {
        category: Category,
        found: usize,
        required: usize,
    },
}

/// A tunable outside its allowed range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{name} = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },

    #[error("tuning overrides are not valid JSON: {0}")]
    Parse(String),
}

/// A score combination that tennis rules can never produce
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("both sides hold advantage")]
    DoubleAdvantage,

    #[error("advantage requires the opponent at 40")]
    AdvantageWithoutDeuce,

    #[error("tiebreak points used outside a tiebreak")]
    TiebreakPointsOutsideTiebreak,

    #[error("regular points used during a tiebreak")]
    RegularPointsInTiebreak,

    #[error("tiebreak active at {player}-{cpu} games, only 6-6 allowed")]
    TiebreakWithoutSixAll { player: u8, cpu: u8 },

    #[error("tiebreak already decided at {player}-{cpu}")]
    TiebreakAlreadyWon { player: u8, cpu: u8 },

    #[error("games tied 6-6 without a tiebreak")]
    MissingTiebreak,

    #[error("set already decided at {player}-{cpu} games")]
    SetAlreadyWon { player: u8, cpu: u8 },

    #[error("{player}-{cpu} sets is not a reachable tally in a best-of-3 match")]
    ImpossibleSets { player: u8, cpu: u8 },
}

/// Anything that stops a simulation from being created
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Bank(#[from] BankError),

    #[error(transparent)]
    Tuning(#[from] TuningError),

    #[error(transparent)]
    Score(#[from] ScoreError),
}
