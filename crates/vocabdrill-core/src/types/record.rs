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

use crate::error::Fallible;
use crate::error::fail;
use crate::sm2::DEFAULT_EASE_FACTOR;
use crate::sm2::EaseFactor;
use crate::sm2::FIRST_INTERVAL;
use crate::sm2::IntervalDays;
use crate::sm2::MIN_EASE_FACTOR;
use crate::sm2::Quality;
use crate::sm2::next_ease_factor;
use crate::sm2::next_interval;
use crate::types::aliases::WordId;
use crate::types::status::MasteryPolicy;
use crate::types::status::Status;
use crate::types::status::next_status;
use crate::types::timestamp::Timestamp;

/// One entry in a record's review history.
///
/// The serialized shape is stable: history rows are persisted as JSON and
/// must round-trip exactly.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub timestamp: Timestamp,
    pub quality: Quality,
    #[serde(rename = "interval")]
    pub interval_days: IntervalDays,
    pub ease_factor: EaseFactor,
}

/// The scheduling state of one (user, word) pair.
///
/// Records are values: the update function consumes a record by reference
/// and returns the successor state, and persistence is the caller's problem.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LearningRecord {
    pub word_id: WordId,
    pub status: Status,
    pub ease_factor: EaseFactor,
    #[serde(rename = "interval")]
    pub interval_days: IntervalDays,
    pub repetitions: u32,
    pub next_review_at: Option<Timestamp>,
    pub last_review_at: Option<Timestamp>,
    pub total_reviews: u32,
    pub correct_count: u32,
    pub history: Vec<ReviewEntry>,
}

impl LearningRecord {
    /// A fresh, never-reviewed record. The session assembler synthesizes
    /// these as placeholders; they are not persisted until the first review.
    pub fn new(word_id: WordId) -> Self {
        Self {
            word_id,
            status: Status::New,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review_at: None,
            last_review_at: None,
            total_reviews: 0,
            correct_count: 0,
            history: Vec::new(),
        }
    }

    /// Whether the record is due for review at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_review_at {
            Some(at) => at <= now,
            None => false,
        }
    }

    /// Check the reachable-state invariants. Run by the storage layer when
    /// loading rows, so a corrupted row is rejected instead of scheduled.
    pub fn validate(&self) -> Fallible<()> {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return fail(format!(
                "record for word {}: ease factor {} is below the floor",
                self.word_id, self.ease_factor
            ));
        }
        if self.interval_days < 0 {
            return fail(format!(
                "record for word {}: negative interval {}",
                self.word_id, self.interval_days
            ));
        }
        if self.correct_count > self.total_reviews {
            return fail(format!(
                "record for word {}: correct count {} exceeds total reviews {}",
                self.word_id, self.correct_count, self.total_reviews
            ));
        }
        let reviewed = self.status != Status::New;
        if reviewed && (self.last_review_at.is_none() || self.next_review_at.is_none()) {
            return fail(format!(
                "record for word {}: reviewed record without review timestamps",
                self.word_id
            ));
        }
        if !reviewed && self.total_reviews != 0 {
            return fail(format!(
                "record for word {}: new record with {} reviews",
                self.word_id, self.total_reviews
            ));
        }
        Ok(())
    }
}

/// The review update function.
///
/// Pure and total: defined for every valid quality and every reachable
/// record state, and deterministic given `now`. Returns the successor
/// record; the input is untouched.
pub fn update_record(
    record: &LearningRecord,
    quality: Quality,
    policy: &MasteryPolicy,
    now: Timestamp,
) -> LearningRecord {
    let ease_factor = next_ease_factor(record.ease_factor, quality);
    let (interval_days, repetitions) = if quality.is_pass() {
        (
            next_interval(record.interval_days, ease_factor),
            record.repetitions + 1,
        )
    } else {
        (FIRST_INTERVAL, 0)
    };
    let status = next_status(record.status, quality, repetitions, interval_days, policy);
    let mut history = record.history.clone();
    history.push(ReviewEntry {
        timestamp: now,
        quality,
        interval_days,
        ease_factor,
    });
    LearningRecord {
        word_id: record.word_id,
        status,
        ease_factor,
        interval_days,
        repetitions,
        next_review_at: Some(now.plus_days(interval_days)),
        last_review_at: Some(now),
        total_reviews: record.total_reviews + 1,
        correct_count: record.correct_count + if quality.is_pass() { 1 } else { 0 },
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn make_timestamp(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    /// A fresh record taken through a pass, a pass, and a failure.
    #[test]
    fn test_worked_example() {
        let policy = MasteryPolicy::default();
        let t0 = make_timestamp("2024-01-01T12:00:00.000");
        let record = LearningRecord::new(42);

        let record = update_record(&record, Quality::Good, &policy, t0);
        assert_eq!(record.interval_days, 1);
        assert!(approx_eq(record.ease_factor, 2.5));
        assert_eq!(record.repetitions, 1);
        assert_eq!(record.status, Status::Reviewing);
        assert_eq!(record.next_review_at, Some(t0.plus_days(1)));
        assert_eq!(record.last_review_at, Some(t0));

        let t1 = t0.plus_days(1);
        let record = update_record(&record, Quality::Easy, &policy, t1);
        assert_eq!(record.interval_days, 6);
        assert!(approx_eq(record.ease_factor, 2.6));
        assert_eq!(record.repetitions, 2);
        assert_eq!(record.status, Status::Mastered);
        assert_eq!(record.next_review_at, Some(t0.plus_days(7)));

        let t2 = t1.plus_days(6);
        let record = update_record(&record, Quality::Again, &policy, t2);
        assert_eq!(record.interval_days, 1);
        assert!(approx_eq(record.ease_factor, 2.6));
        assert_eq!(record.repetitions, 0);
        assert_eq!(record.status, Status::Learning);
        assert_eq!(record.total_reviews, 3);
        assert_eq!(record.correct_count, 2);
        assert_eq!(record.history.len(), 3);
    }

    /// A failure resets interval and repetitions regardless of prior state.
    #[test]
    fn test_failure_reset() {
        let policy = MasteryPolicy::default();
        let now = make_timestamp("2024-06-01T09:00:00.000");
        let record = LearningRecord {
            word_id: 7,
            status: Status::Mastered,
            ease_factor: 2.2,
            interval_days: 120,
            repetitions: 9,
            next_review_at: Some(now),
            last_review_at: Some(now.plus_days(-120)),
            total_reviews: 9,
            correct_count: 9,
            history: Vec::new(),
        };
        let updated = update_record(&record, Quality::Again, &policy, now);
        assert_eq!(updated.interval_days, 1);
        assert_eq!(updated.repetitions, 0);
        assert_eq!(updated.status, Status::Learning);
        assert!(approx_eq(updated.ease_factor, 2.2));
        assert_eq!(updated.next_review_at, Some(now.plus_days(1)));
        assert_eq!(updated.correct_count, 9);
        assert_eq!(updated.total_reviews, 10);
    }

    /// The input record is not mutated and the update is deterministic.
    #[test]
    fn test_purity() {
        let policy = MasteryPolicy::default();
        let now = make_timestamp("2024-06-01T09:00:00.000");
        let record = LearningRecord::new(1);
        let snapshot = record.clone();
        let a = update_record(&record, Quality::Hard, &policy, now);
        let b = update_record(&record, Quality::Hard, &policy, now);
        assert_eq!(record, snapshot);
        assert_eq!(a, b);
    }

    /// Counters only grow, and the correct count only grows on a pass.
    #[test]
    fn test_counters() {
        let policy = MasteryPolicy::default();
        let mut now = make_timestamp("2024-06-01T09:00:00.000");
        let mut record = LearningRecord::new(1);
        let qualities = [
            Quality::Good,
            Quality::Again,
            Quality::Hard,
            Quality::Easy,
            Quality::Again,
        ];
        let mut expected_correct = 0;
        for (n, q) in qualities.into_iter().enumerate() {
            record = update_record(&record, q, &policy, now);
            if q.is_pass() {
                expected_correct += 1;
            }
            assert_eq!(record.total_reviews, (n + 1) as u32);
            assert_eq!(record.correct_count, expected_correct);
            now = now.plus_days(1);
        }
    }

    /// Each update appends exactly one history entry; prior entries are
    /// untouched.
    #[test]
    fn test_history_append_only() {
        let policy = MasteryPolicy::default();
        let t0 = make_timestamp("2024-06-01T09:00:00.000");
        let record = LearningRecord::new(1);
        let first = update_record(&record, Quality::Good, &policy, t0);
        let second = update_record(&first, Quality::Again, &policy, t0.plus_days(1));
        assert_eq!(second.history.len(), 2);
        assert_eq!(second.history[0], first.history[0]);
        assert_eq!(second.history[1].quality, Quality::Again);
        assert_eq!(second.history[1].interval_days, 1);
    }

    /// The persisted shape of a history entry is fixed.
    #[test]
    fn test_history_entry_shape() -> Fallible<()> {
        let entry = ReviewEntry {
            timestamp: make_timestamp("2024-01-01T12:00:00.000"),
            quality: Quality::Good,
            interval_days: 1,
            ease_factor: 2.5,
        };
        let serialized = serde_json::to_string(&entry)?;
        assert_eq!(
            serialized,
            "{\"timestamp\":\"2024-01-01T12:00:00.000\",\"quality\":4,\"interval\":1,\"ease_factor\":2.5}"
        );
        let deserialized: ReviewEntry = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, entry);
        Ok(())
    }

    #[test]
    fn test_is_due() {
        let now = make_timestamp("2024-06-01T09:00:00.000");
        let mut record = LearningRecord::new(1);
        assert!(!record.is_due(now));
        record.next_review_at = Some(now);
        assert!(record.is_due(now));
        record.next_review_at = Some(now.plus_days(1));
        assert!(!record.is_due(now));
        record.next_review_at = Some(now.plus_days(-30));
        assert!(record.is_due(now));
    }

    #[test]
    fn test_validate_accepts_reachable_states() -> Fallible<()> {
        let policy = MasteryPolicy::default();
        let mut now = make_timestamp("2024-06-01T09:00:00.000");
        let mut record = LearningRecord::new(1);
        record.validate()?;
        for q in [Quality::Good, Quality::Again, Quality::Easy, Quality::Hard] {
            record = update_record(&record, q, &policy, now);
            record.validate()?;
            now = now.plus_days(1);
        }
        Ok(())
    }

    #[test]
    fn test_validate_rejects_corrupt_states() {
        let base = LearningRecord::new(1);

        let mut r = base.clone();
        r.ease_factor = 1.1;
        assert!(r.validate().is_err());

        let mut r = base.clone();
        r.interval_days = -1;
        assert!(r.validate().is_err());

        let mut r = base.clone();
        r.correct_count = 1;
        assert!(r.validate().is_err());

        let mut r = base.clone();
        r.status = Status::Reviewing;
        assert!(r.validate().is_err());

        let mut r = base;
        r.total_reviews = 2;
        r.correct_count = 1;
        assert!(r.validate().is_err());
    }
}
