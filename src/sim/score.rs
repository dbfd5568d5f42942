//! Tennis scoring rules
//!
//! Points run 0-15-30-40-game with deuce and advantage, sets are first to six
//! games by two with a tiebreak at 6-6, and the match is best of three sets.
//! `award_point`, `award_game` and `award_set` never mutate their input: each
//! returns the next `Score` together with what the point decided, so identical
//! inputs always give identical outputs.

use serde::Serialize;

use super::state::Side;
use crate::error::ScoreError;

/// Sets needed to win the match
pub const SETS_TO_WIN: u8 = 2;
/// Games needed to take a set (with a two game margin)
pub const GAMES_TO_WIN_SET: u8 = 6;
/// Points needed to take a tiebreak (with a two point margin)
pub const TIEBREAK_POINTS_TO_WIN: u8 = 7;

/// Regular game point values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PointValue {
    Love,
    Fifteen,
    Thirty,
    Forty,
}

impl PointValue {
    pub fn label(&self) -> &'static str {
        match self {
            PointValue::Love => "0",
            PointValue::Fifteen => "15",
            PointValue::Thirty => "30",
            PointValue::Forty => "40",
        }
    }

    fn next(self) -> Self {
        match self {
            PointValue::Love => PointValue::Fifteen,
            PointValue::Fifteen => PointValue::Thirty,
            PointValue::Thirty | PointValue::Forty => PointValue::Forty,
        }
    }
}

/// One side's standing inside the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointScore {
    Points(PointValue),
    Advantage,
    TiebreakPoints(u8),
}

impl PointScore {
    pub const LOVE: PointScore = PointScore::Points(PointValue::Love);

    pub fn label(&self) -> String {
        match self {
            PointScore::Points(v) => v.label().to_string(),
            PointScore::Advantage => "AD".to_string(),
            PointScore::TiebreakPoints(n) => n.to_string(),
        }
    }

    fn tiebreak_points(&self) -> u8 {
        match self {
            PointScore::TiebreakPoints(n) => *n,
            _ => 0,
        }
    }
}

/// Games taken in a finished set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResult {
    pub player_games: u8,
    pub cpu_games: u8,
    /// Final tiebreak points (player, cpu) when the set went to one
    pub tiebreak: Option<(u8, u8)>,
}

/// What a point decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Award {
    Point,
    Game(Side),
    Set(Side),
    Match(Side),
}

impl Award {
    pub fn match_winner(&self) -> Option<Side> {
        match self {
            Award::Match(side) => Some(*side),
            _ => None,
        }
    }
}

/// Complete match score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player_points: PointScore,
    pub cpu_points: PointScore,
    pub player_games: u8,
    pub cpu_games: u8,
    pub player_sets: u8,
    pub cpu_sets: u8,
    /// Current set (0-based)
    pub set_index: u8,
    pub tiebreak: bool,
    /// Side serving the next point
    pub server: Side,
    /// Side that served the first point of the running tiebreak
    pub tiebreak_first_server: Side,
    pub completed_sets: Vec<SetResult>,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(Side::Player)
    }
}

impl Score {
    /// Fresh 0-0 score with `server` to serve first
    pub fn new(server: Side) -> Self {
        Self {
            player_points: PointScore::LOVE,
            cpu_points: PointScore::LOVE,
            player_games: 0,
            cpu_games: 0,
            player_sets: 0,
            cpu_sets: 0,
            set_index: 0,
            tiebreak: false,
            server,
            tiebreak_first_server: server,
            completed_sets: Vec::new(),
        }
    }

    pub fn points(&self, side: Side) -> PointScore {
        match side {
            Side::Player => self.player_points,
            Side::Cpu => self.cpu_points,
        }
    }

    pub fn games(&self, side: Side) -> u8 {
        match side {
            Side::Player => self.player_games,
            Side::Cpu => self.cpu_games,
        }
    }

    pub fn sets(&self, side: Side) -> u8 {
        match side {
            Side::Player => self.player_sets,
            Side::Cpu => self.cpu_sets,
        }
    }

    fn points_mut(&mut self, side: Side) -> &mut PointScore {
        match side {
            Side::Player => &mut self.player_points,
            Side::Cpu => &mut self.cpu_points,
        }
    }

    fn games_mut(&mut self, side: Side) -> &mut u8 {
        match side {
            Side::Player => &mut self.player_games,
            Side::Cpu => &mut self.cpu_games,
        }
    }

    fn sets_mut(&mut self, side: Side) -> &mut u8 {
        match side {
            Side::Player => &mut self.player_sets,
            Side::Cpu => &mut self.cpu_sets,
        }
    }

    fn reset_points(&mut self) {
        let start = if self.tiebreak {
            PointScore::TiebreakPoints(0)
        } else {
            PointScore::LOVE
        };
        self.player_points = start;
        self.cpu_points = start;
    }

    /// True once either side holds two sets
    pub fn is_match_over(&self) -> bool {
        self.player_sets >= 2 || self.cpu_sets >= 2
    }

    pub fn match_winner(&self) -> Option<Side> {
        if self.player_sets >= SETS_TO_WIN {
            Some(Side::Player)
        } else if self.cpu_sets >= SETS_TO_WIN {
            Some(Side::Cpu)
        } else {
            None
        }
    }

    /// Scoreboard labels for the running game (player, cpu)
    pub fn point_labels(&self) -> (String, String) {
        (self.player_points.label(), self.cpu_points.label())
    }

    /// Award a point to `winner`
    pub fn award_point(&self, winner: Side) -> (Score, Award) {
        let mut next = self.clone();
        let loser = winner.other();

        if next.tiebreak {
            let won = next.points(winner).tiebreak_points() + 1;
            let lost = next.points(loser).tiebreak_points();
            *next.points_mut(winner) = PointScore::TiebreakPoints(won);
            if won >= TIEBREAK_POINTS_TO_WIN && won.saturating_sub(lost) >= 2 {
                return next.award_game(winner);
            }
            next.rotate_tiebreak_server();
            return (next, Award::Point);
        }

        match (next.points(winner), next.points(loser)) {
            (PointScore::Advantage, _) => return next.award_game(winner),
            (_, PointScore::Advantage) => {
                // Back to deuce
                *next.points_mut(winner) = PointScore::Points(PointValue::Forty);
                *next.points_mut(loser) = PointScore::Points(PointValue::Forty);
            }
            (PointScore::Points(PointValue::Forty), PointScore::Points(PointValue::Forty)) => {
                *next.points_mut(winner) = PointScore::Advantage;
            }
            (PointScore::Points(PointValue::Forty), _) => return next.award_game(winner),
            (PointScore::Points(value), _) => {
                *next.points_mut(winner) = PointScore::Points(value.next());
            }
            // Stale tiebreak count outside a tiebreak counts as love
            (PointScore::TiebreakPoints(_), _) => {
                *next.points_mut(winner) = PointScore::Points(PointValue::Fifteen);
            }
        }

        (next, Award::Point)
    }

    /// Award the current game to `winner`. During a tiebreak this takes the
    /// set, but only once `winner` holds seven points with a two point lead;
    /// before that the score is returned unchanged.
    pub fn award_game(&self, winner: Side) -> (Score, Award) {
        let mut next = self.clone();
        let loser = winner.other();
        let was_tiebreak = next.tiebreak;

        if was_tiebreak {
            let won = next.points(winner).tiebreak_points();
            let lost = next.points(loser).tiebreak_points();
            if won < TIEBREAK_POINTS_TO_WIN || won.saturating_sub(lost) < 2 {
                log::warn!("Tiebreak undecided at {}-{}, no game awarded", won, lost);
                return (next, Award::Point);
            }
        }

        *next.games_mut(winner) += 1;
        let won = next.games(winner);
        let lost = next.games(loser);

        if was_tiebreak || (won >= GAMES_TO_WIN_SET && won.saturating_sub(lost) >= 2) {
            // The tiebreak receiver opens the next set
            next.server = if was_tiebreak {
                next.tiebreak_first_server.other()
            } else {
                next.server.other()
            };
            return next.award_set(winner);
        }

        next.server = next.server.other();
        if won == GAMES_TO_WIN_SET && lost == GAMES_TO_WIN_SET {
            next.tiebreak = true;
            next.tiebreak_first_server = next.server;
            log::info!("Six games all: tiebreak");
        }
        next.reset_points();

        (next, Award::Game(winner))
    }

    /// Award the current set to `winner`
    pub fn award_set(&self, winner: Side) -> (Score, Award) {
        let mut next = self.clone();

        let finished = SetResult {
            player_games: next.player_games,
            cpu_games: next.cpu_games,
            tiebreak: next.tiebreak.then_some((
                next.player_points.tiebreak_points(),
                next.cpu_points.tiebreak_points(),
            )),
        };
        next.completed_sets.push(finished);
        *next.sets_mut(winner) += 1;
        next.player_games = 0;
        next.cpu_games = 0;
        next.tiebreak = false;
        next.reset_points();
        next.set_index += 1;

        if next.player_sets >= 2 || next.cpu_sets >= 2 {
            return (next, Award::Match(winner));
        }
        (next, Award::Set(winner))
    }

    fn rotate_tiebreak_server(&mut self) {
        let played =
            self.player_points.tiebreak_points() as u32 + self.cpu_points.tiebreak_points() as u32;
        // First server takes one point, then service changes every two
        self.server = if ((played + 1) / 2) % 2 == 0 {
            self.tiebreak_first_server
        } else {
            self.tiebreak_first_server.other()
        };
    }

    /// Reject combinations tennis rules cannot reach
    pub fn validate(&self) -> Result<(), ScoreError> {
        let (ps, cs) = (self.player_sets, self.cpu_sets);
        if ps > SETS_TO_WIN || cs > SETS_TO_WIN || (ps == SETS_TO_WIN && cs == SETS_TO_WIN) {
            return Err(ScoreError::ImpossibleSets {
                player: ps,
                cpu: cs,
            });
        }

        let (pg, cg) = (self.player_games, self.cpu_games);
        if self.tiebreak {
            if pg != GAMES_TO_WIN_SET || cg != GAMES_TO_WIN_SET {
                return Err(ScoreError::TiebreakWithoutSixAll {
                    player: pg,
                    cpu: cg,
                });
            }
            let (PointScore::TiebreakPoints(p), PointScore::TiebreakPoints(c)) =
                (self.player_points, self.cpu_points)
            else {
                return Err(ScoreError::RegularPointsInTiebreak);
            };
            if p.max(c) >= TIEBREAK_POINTS_TO_WIN && p.abs_diff(c) >= 2 {
                return Err(ScoreError::TiebreakAlreadyWon { player: p, cpu: c });
            }
            return Ok(());
        }

        let (hi, lo) = (pg.max(cg), pg.min(cg));
        if hi == GAMES_TO_WIN_SET && lo == GAMES_TO_WIN_SET {
            return Err(ScoreError::MissingTiebreak);
        }
        if hi > GAMES_TO_WIN_SET || (hi == GAMES_TO_WIN_SET && lo + 2 <= hi) {
            return Err(ScoreError::SetAlreadyWon {
                player: pg,
                cpu: cg,
            });
        }

        match (self.player_points, self.cpu_points) {
            (PointScore::TiebreakPoints(_), _) | (_, PointScore::TiebreakPoints(_)) => {
                Err(ScoreError::TiebreakPointsOutsideTiebreak)
            }
            (PointScore::Advantage, PointScore::Advantage) => Err(ScoreError::DoubleAdvantage),
            (PointScore::Advantage, other) | (other, PointScore::Advantage)
                if other != PointScore::Points(PointValue::Forty) =>
            {
                Err(ScoreError::AdvantageWithoutDeuce)
            }
            _ => Ok(()),
        }
    }
}
