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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::sm2::IntervalDays;
use crate::sm2::Quality;

/// The learning state of a record.
///
/// `New` only ever appears before the first review: every call to the update
/// function lands on one of the other three states.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Status {
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Reviewing => "reviewing",
            Status::Mastered => "mastered",
        }
    }

    /// The integer code used in the progress table.
    pub fn code(self) -> i64 {
        match self {
            Status::New => 0,
            Status::Learning => 1,
            Status::Reviewing => 2,
            Status::Mastered => 3,
        }
    }

    pub fn from_code(code: i64) -> Fallible<Self> {
        match code {
            0 => Ok(Status::New),
            1 => Ok(Status::Learning),
            2 => Ok(Status::Reviewing),
            3 => Ok(Status::Mastered),
            _ => fail(format!("invalid status code: {code}")),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "new" => Ok(Status::New),
            "learning" => Ok(Status::Learning),
            "reviewing" => Ok(Status::Reviewing),
            "mastered" => Ok(Status::Mastered),
            _ => fail(format!("invalid status string: {value}")),
        }
    }
}

/// The configurable mastery condition.
///
/// A record is promoted to `Mastered` only when it was already consolidated
/// (status `Reviewing` or `Mastered` before the review), the review scored at
/// least `min_quality`, and the post-review repetition count and interval
/// meet the thresholds. The defaults reduce the condition to "a confident
/// pass on a consolidated record".
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MasteryPolicy {
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
    #[serde(default)]
    pub min_repetitions: u32,
    #[serde(default)]
    pub min_interval_days: IntervalDays,
}

fn default_min_quality() -> u8 {
    4
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            min_quality: default_min_quality(),
            min_repetitions: 0,
            min_interval_days: 0,
        }
    }
}

impl MasteryPolicy {
    /// The mastery predicate. `repetitions` and `interval_days` are the
    /// values after the review being judged.
    pub fn mastery_reached(
        &self,
        prev: Status,
        quality: Quality,
        repetitions: u32,
        interval_days: IntervalDays,
    ) -> bool {
        let consolidated = matches!(prev, Status::Reviewing | Status::Mastered);
        consolidated
            && quality.score() >= self.min_quality
            && repetitions >= self.min_repetitions
            && interval_days >= self.min_interval_days
    }
}

/// The status transition applied on every review.
///
/// A failure always lands on `Learning`, including from `Mastered`: mastery
/// is not sticky. A pass lands on `Reviewing` until the mastery predicate
/// holds.
pub fn next_status(
    prev: Status,
    quality: Quality,
    repetitions: u32,
    interval_days: IntervalDays,
    policy: &MasteryPolicy,
) -> Status {
    if !quality.is_pass() {
        Status::Learning
    } else if policy.mastery_reached(prev, quality, repetitions, interval_days) {
        Status::Mastered
    } else {
        Status::Reviewing
    }
}
