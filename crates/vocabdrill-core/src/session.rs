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

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::types::aliases::BookId;
use crate::types::aliases::WordId;
use crate::types::record::LearningRecord;
use crate::types::timestamp::Timestamp;

/// A user's active study plan.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StudyPlanConfig {
    /// The book new words are drawn from.
    pub book_id: BookId,
    /// Maximum new words per session. Zero still allows review-only sessions.
    pub daily_new: usize,
    /// Maximum review words per session.
    pub daily_review: usize,
}

/// A word from the plan's book that the user has no record for yet.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct NewCandidate {
    pub word_id: WordId,
    /// Corpus frequency rank; lower is more common. Unranked words sort last.
    pub frequency_rank: Option<u32>,
}

/// One assembled study session: review records first, then placeholder
/// records for new words.
#[derive(Clone, PartialEq, Debug)]
pub struct Session {
    pub entries: Vec<LearningRecord>,
    /// The full count of due records, before any cap.
    pub total_due: usize,
    pub review_count: usize,
    pub new_count: usize,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assemble one study session from a snapshot of the user's records.
///
/// Read-only and deterministic: the ordering is fully specified (due records
/// by ascending due time, ties by word id; new candidates by ascending
/// frequency rank, ties by word id), and nothing here writes. `candidates`
/// is the new-word supply the caller fetched from the catalog for the plan's
/// book; it is ignored without an active plan, so a missing plan degrades to
/// a review-only session. A `limit` of zero yields an empty session, which
/// callers use for dry-run stat queries.
pub fn assemble(
    records: &[LearningRecord],
    candidates: &[NewCandidate],
    plan: Option<&StudyPlanConfig>,
    now: Timestamp,
    limit: usize,
) -> Session {
    let mut due: Vec<&LearningRecord> = records.iter().filter(|r| r.is_due(now)).collect();
    due.sort_by_key(|r| (r.next_review_at, r.word_id));
    let total_due = due.len();

    let review_cap = match plan {
        Some(plan) => usize::min(plan.daily_review, limit),
        None => limit,
    };
    let review: Vec<LearningRecord> = due.into_iter().take(review_cap).cloned().collect();
    let review_count = review.len();

    let new_cap = match plan {
        Some(plan) => usize::min(plan.daily_new, limit.saturating_sub(review_count)),
        None => 0,
    };
    let mut fresh: Vec<&NewCandidate> = Vec::new();
    if new_cap > 0 {
        // The catalog query already excludes recorded words, but the
        // assembler must hold for any snapshot it is handed.
        let known: HashSet<WordId> = records.iter().map(|r| r.word_id).collect();
        fresh = candidates
            .iter()
            .filter(|c| !known.contains(&c.word_id))
            .collect();
        fresh.sort_by_key(|c| (rank_key(c), c.word_id));
        fresh.truncate(new_cap);
    }
    let new_count = fresh.len();

    let mut entries = review;
    entries.extend(fresh.into_iter().map(|c| LearningRecord::new(c.word_id)));

    Session {
        entries,
        total_due,
        review_count,
        new_count,
    }
}

fn rank_key(c: &NewCandidate) -> i64 {
    match c.frequency_rank {
        Some(rank) => rank as i64,
        None => i64::MAX,
    }
}
