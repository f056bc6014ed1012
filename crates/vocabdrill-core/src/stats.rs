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

use crate::types::record::LearningRecord;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// Summary statistics over a user's records.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_words: usize,
    pub mastered: usize,
    /// Records in the `Learning` or `Reviewing` state.
    pub learning: usize,
    pub new_words: usize,
    pub due_now: usize,
    /// Lifetime share of passing reviews, zero when nothing was reviewed.
    pub accuracy: f64,
}

pub fn study_stats(records: &[LearningRecord], now: Timestamp) -> StudyStats {
    let mut mastered = 0;
    let mut learning = 0;
    let mut new_words = 0;
    let mut due_now = 0;
    let mut total_reviews: u64 = 0;
    let mut correct: u64 = 0;
    for record in records {
        match record.status {
            Status::New => new_words += 1,
            Status::Learning | Status::Reviewing => learning += 1,
            Status::Mastered => mastered += 1,
        }
        if record.is_due(now) {
            due_now += 1;
        }
        total_reviews += record.total_reviews as u64;
        correct += record.correct_count as u64;
    }
    let accuracy = if total_reviews > 0 {
        correct as f64 / total_reviews as f64
    } else {
        0.0
    };
    StudyStats {
        total_words: records.len(),
        mastered,
        learning,
        new_words,
        due_now,
        accuracy,
    }
}
