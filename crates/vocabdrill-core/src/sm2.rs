// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

pub type EaseFactor = f64;
pub type IntervalDays = i64;

/// The lower bound of the ease factor.
pub const MIN_EASE_FACTOR: EaseFactor = 1.3;

/// The ease factor assigned to a record on creation.
pub const DEFAULT_EASE_FACTOR: EaseFactor = 2.5;

/// The interval after the first successful review, and after any failure.
pub const FIRST_INTERVAL: IntervalDays = 1;

/// The interval after the second consecutive successful review.
pub const SECOND_INTERVAL: IntervalDays = 6;

/// A self-reported recall score for one review.
///
/// The scale is deliberately sparse: the numeric scores are 0, 3, 4, and 5,
/// and the in-between values of the full SM-2 scale are not accepted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quality {
    /// No recall at all. Score 0.
    Again,
    /// Recalled with difficulty. Score 3.
    Hard,
    /// Recalled with some hesitation. Score 4.
    Good,
    /// Recalled instantly. Score 5.
    Easy,
}

impl Quality {
    pub fn score(self) -> u8 {
        match self {
            Quality::Again => 0,
            Quality::Hard => 3,
            Quality::Good => 4,
            Quality::Easy => 5,
        }
    }

    /// Whether this review counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self.score() >= 3
    }

    pub fn as_str(&self) -> &str {
        match self {
            Quality::Again => "again",
            Quality::Hard => "hard",
            Quality::Good => "good",
            Quality::Easy => "easy",
        }
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.score()
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQualityScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Again),
            3 => Ok(Quality::Hard),
            4 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(InvalidQualityScore(other)),
        }
    }
}

/// Error for a quality score outside the valid set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InvalidQualityScore(pub u8);

impl Display for InvalidQualityScore {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "invalid quality score: {} (valid scores are 0, 3, 4, 5)",
            self.0
        )
    }
}

impl Error for InvalidQualityScore {}

/// The ease factor after a review.
///
/// A failure leaves the ease factor untouched: failing only resets progress,
/// it does not compound a penalty.
pub fn next_ease_factor(prior: EaseFactor, quality: Quality) -> EaseFactor {
    if quality.is_pass() {
        ef_pass(prior, quality)
    } else {
        prior
    }
}

fn ef_pass(prior: EaseFactor, quality: Quality) -> EaseFactor {
    let q = quality.score() as f64;
    let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    f64::max(MIN_EASE_FACTOR, prior + delta)
}

/// The interval after a successful review, keyed on the prior interval.
///
/// The growth step truncates rather than rounds. Stored schedules depend on
/// this, so it must not change.
pub fn next_interval(prior_interval: IntervalDays, ease_factor: EaseFactor) -> IntervalDays {
    match prior_interval {
        0 => FIRST_INTERVAL,
        1 => SECOND_INTERVAL,
        _ => ((prior_interval as f64) * ease_factor).floor() as IntervalDays,
    }
}
