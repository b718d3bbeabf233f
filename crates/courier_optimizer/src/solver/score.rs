use std::{
    cmp::Ordering,
    iter,
    ops::{Add, AddAssign, Sub},
};

use serde::Serialize;

/// Improvements smaller than this are noise.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Lexicographic score: the hard level (stops left unassigned) always dominates
/// the soft level (cost under the configured policy). Lower is better.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Score {
    pub hard_score: f64,
    pub soft_score: f64,
}

impl Score {
    pub const ZERO: Score = Score {
        hard_score: 0.0,
        soft_score: 0.0,
    };

    pub fn new(hard_score: f64, soft_score: f64) -> Self {
        Score {
            hard_score,
            soft_score,
        }
    }

    pub fn hard(hard_score: f64) -> Self {
        Score {
            hard_score,
            soft_score: 0.0,
        }
    }

    pub fn soft(soft_score: f64) -> Self {
        Score {
            hard_score: 0.0,
            soft_score,
        }
    }

    /// Whether this score, read as a delta, is a strict improvement.
    pub fn is_improvement(&self) -> bool {
        self.hard_score < 0.0 || (self.hard_score == 0.0 && self.soft_score < -SCORE_EPSILON)
    }

    /// Whether `self` is better than `other` by more than noise.
    pub fn is_better_than(&self, other: &Score) -> bool {
        (*self - *other).is_improvement()
    }
}

impl Eq for Score {}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard_score
            .total_cmp(&other.hard_score)
            .then_with(|| self.soft_score.total_cmp(&other.soft_score))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl iter::Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Score::ZERO, |acc, score| acc + score)
    }
}

impl Add<Score> for Score {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Score {
            hard_score: self.hard_score + other.hard_score,
            soft_score: self.soft_score + other.soft_score,
        }
    }
}

impl AddAssign<Score> for Score {
    fn add_assign(&mut self, other: Score) {
        self.hard_score += other.hard_score;
        self.soft_score += other.soft_score;
    }
}

impl Sub<Score> for Score {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Score {
            hard_score: self.hard_score - other.hard_score,
            soft_score: self.soft_score - other.soft_score,
        }
    }
}
