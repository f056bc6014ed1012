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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Serialize;

use vocabdrill_core::session::NewCandidate;
use vocabdrill_core::session::StudyPlanConfig;
use vocabdrill_core::types::aliases::BookId;
use vocabdrill_core::types::aliases::UserId;
use vocabdrill_core::types::aliases::WordId;
use vocabdrill_core::types::record::LearningRecord;
use vocabdrill_core::types::status::Status;
use vocabdrill_core::types::timestamp::Timestamp;

use crate::error::ErrorReport;
use crate::error::Fallible;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY,
    book_id INTEGER NOT NULL REFERENCES books(id),
    spelling TEXT NOT NULL,
    definition TEXT NOT NULL,
    frequency_rank INTEGER
);

CREATE INDEX IF NOT EXISTS idx_words_book ON words (book_id, frequency_rank);

CREATE TABLE IF NOT EXISTS progress (
    user_id INTEGER NOT NULL,
    word_id INTEGER NOT NULL REFERENCES words(id),
    status INTEGER NOT NULL,
    ease_factor REAL NOT NULL,
    interval INTEGER NOT NULL,
    repetitions INTEGER NOT NULL,
    next_review_at TEXT,
    last_review_at TEXT,
    total_reviews INTEGER NOT NULL,
    correct_count INTEGER NOT NULL,
    history TEXT NOT NULL,
    PRIMARY KEY (user_id, word_id)
);

CREATE INDEX IF NOT EXISTS idx_progress_user_due ON progress (user_id, next_review_at);

CREATE TABLE IF NOT EXISTS study_plans (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    book_id INTEGER NOT NULL REFERENCES books(id),
    name TEXT NOT NULL,
    daily_new INTEGER NOT NULL,
    daily_review INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);
";

/// A word in the shared catalog.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Word {
    pub id: WordId,
    pub book_id: BookId,
    pub spelling: String,
    pub definition: String,
    pub frequency_rank: Option<u32>,
}

/// The SQLite database holding the word catalog, per-user progress, and
/// study plans.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &str) -> Fallible<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Fallible<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_book(&self, name: &str) -> Fallible<BookId> {
        self.conn
            .execute("INSERT INTO books (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn book_name(&self, book_id: BookId) -> Fallible<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM books WHERE id = ?1",
                params![book_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    pub fn insert_word(
        &self,
        book_id: BookId,
        spelling: &str,
        definition: &str,
        frequency_rank: Option<u32>,
    ) -> Fallible<WordId> {
        self.conn.execute(
            "INSERT INTO words (book_id, spelling, definition, frequency_rank)
             VALUES (?1, ?2, ?3, ?4)",
            params![book_id, spelling, definition, frequency_rank],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn word(&self, word_id: WordId) -> Fallible<Option<Word>> {
        let word = self
            .conn
            .query_row(
                "SELECT id, book_id, spelling, definition, frequency_rank
                 FROM words WHERE id = ?1",
                params![word_id],
                |row| {
                    Ok(Word {
                        id: row.get(0)?,
                        book_id: row.get(1)?,
                        spelling: row.get(2)?,
                        definition: row.get(3)?,
                        frequency_rank: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(word)
    }

    /// All progress records owned by a user. Rows are validated on load, so
    /// a corrupted row surfaces as an error instead of entering a session.
    pub fn records_for_user(&self, user_id: UserId) -> Fallible<Vec<LearningRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT word_id, status, ease_factor, interval, repetitions,
                    next_review_at, last_review_at, total_reviews,
                    correct_count, history
             FROM progress WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id], raw_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(record_from_raw(row?)?);
        }
        Ok(records)
    }

    pub fn get_record(&self, user_id: UserId, word_id: WordId) -> Fallible<Option<LearningRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT word_id, status, ease_factor, interval, repetitions,
                        next_review_at, last_review_at, total_reviews,
                        correct_count, history
                 FROM progress WHERE user_id = ?1 AND word_id = ?2",
                params![user_id, word_id],
                raw_from_row,
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(record_from_raw(raw)?)),
            None => Ok(None),
        }
    }

    /// Upsert keyed by (user, word), with an optimistic version check: the
    /// row is only written if its stored review count still matches the
    /// state the update was computed from. Returns false when the check
    /// fails, i.e. a concurrent submission got there first.
    pub fn persist_record(
        &self,
        user_id: UserId,
        record: &LearningRecord,
        prior_reviews: u32,
    ) -> Fallible<bool> {
        let history = serde_json::to_string(&record.history)?;
        let next_review_at = record.next_review_at.map(|t| t.to_string());
        let last_review_at = record.last_review_at.map(|t| t.to_string());
        if prior_reviews == 0 {
            let result = self.conn.execute(
                "INSERT INTO progress (user_id, word_id, status, ease_factor,
                                       interval, repetitions, next_review_at,
                                       last_review_at, total_reviews,
                                       correct_count, history)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    user_id,
                    record.word_id,
                    record.status.code(),
                    record.ease_factor,
                    record.interval_days,
                    record.repetitions,
                    next_review_at,
                    last_review_at,
                    record.total_reviews,
                    record.correct_count,
                    history
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        } else {
            let affected = self.conn.execute(
                "UPDATE progress
                 SET status = ?1, ease_factor = ?2, interval = ?3,
                     repetitions = ?4, next_review_at = ?5,
                     last_review_at = ?6, total_reviews = ?7,
                     correct_count = ?8, history = ?9
                 WHERE user_id = ?10 AND word_id = ?11
                   AND total_reviews = ?12",
                params![
                    record.status.code(),
                    record.ease_factor,
                    record.interval_days,
                    record.repetitions,
                    next_review_at,
                    last_review_at,
                    record.total_reviews,
                    record.correct_count,
                    history,
                    user_id,
                    record.word_id,
                    prior_reviews
                ],
            )?;
            Ok(affected == 1)
        }
    }

    /// Words of a book with no progress row for the user, most common first.
    /// The ordering matches the session assembler's comparator.
    pub fn new_candidates(
        &self,
        user_id: UserId,
        book_id: BookId,
        limit: usize,
    ) -> Fallible<Vec<NewCandidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.id, w.frequency_rank
             FROM words w
             WHERE w.book_id = ?1
               AND NOT EXISTS (SELECT 1 FROM progress p
                               WHERE p.user_id = ?2 AND p.word_id = w.id)
             ORDER BY w.frequency_rank IS NULL, w.frequency_rank ASC, w.id ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![book_id, user_id, limit as i64], |row| {
            Ok(NewCandidate {
                word_id: row.get(0)?,
                frequency_rank: row.get(1)?,
            })
        })?;
        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row?);
        }
        Ok(candidates)
    }

    pub fn active_plan(&self, user_id: UserId) -> Fallible<Option<StudyPlanConfig>> {
        let plan = self
            .conn
            .query_row(
                "SELECT book_id, daily_new, daily_review
                 FROM study_plans
                 WHERE user_id = ?1 AND is_active = 1
                 ORDER BY id DESC LIMIT 1",
                params![user_id],
                |row| {
                    Ok(StudyPlanConfig {
                        book_id: row.get(0)?,
                        daily_new: row.get::<_, u32>(1)? as usize,
                        daily_review: row.get::<_, u32>(2)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(plan)
    }

    /// Create a plan and make it the user's active one. Any previously
    /// active plan is deactivated, not deleted.
    pub fn set_active_plan(
        &self,
        user_id: UserId,
        book_id: BookId,
        name: &str,
        daily_new: usize,
        daily_review: usize,
    ) -> Fallible<()> {
        self.conn.execute(
            "UPDATE study_plans SET is_active = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        self.conn.execute(
            "INSERT INTO study_plans (user_id, book_id, name, daily_new,
                                      daily_review, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![user_id, book_id, name, daily_new as i64, daily_review as i64],
        )?;
        Ok(())
    }
}

type RawRecord = (
    i64,
    i64,
    f64,
    i64,
    i64,
    Option<String>,
    Option<String>,
    i64,
    i64,
    String,
);

fn raw_from_row(row: &Row) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn record_from_raw(raw: RawRecord) -> Fallible<LearningRecord> {
    let (
        word_id,
        status,
        ease_factor,
        interval,
        repetitions,
        next_review_at,
        last_review_at,
        total_reviews,
        correct_count,
        history,
    ) = raw;
    let record = LearningRecord {
        word_id,
        status: Status::from_code(status)?,
        ease_factor,
        interval_days: interval,
        repetitions: counter(repetitions, "repetitions")?,
        next_review_at: next_review_at.map(Timestamp::try_from).transpose()?,
        last_review_at: last_review_at.map(Timestamp::try_from).transpose()?,
        total_reviews: counter(total_reviews, "total_reviews")?,
        correct_count: counter(correct_count, "correct_count")?,
        history: serde_json::from_str(&history)?,
    };
    record.validate()?;
    Ok(record)
}

fn counter(value: i64, column: &str) -> Fallible<u32> {
    u32::try_from(value).map_err(|_| ErrorReport::new(format!("invalid {column} value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocabdrill_core::sm2::Quality;
    use vocabdrill_core::types::record::update_record;
    use vocabdrill_core::types::status::MasteryPolicy;

    fn make_timestamp(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn seeded() -> Fallible<(Database, BookId, Vec<WordId>)> {
        let db = Database::open_in_memory()?;
        let book_id = db.insert_book("CET-4")?;
        let mut word_ids = Vec::new();
        word_ids.push(db.insert_word(book_id, "abandon", "to give up", Some(3))?);
        word_ids.push(db.insert_word(book_id, "ability", "skill or talent", Some(1))?);
        word_ids.push(db.insert_word(book_id, "abroad", "in a foreign country", None)?);
        Ok((db, book_id, word_ids))
    }

    #[test]
    fn test_word_lookup() -> Fallible<()> {
        let (db, book_id, word_ids) = seeded()?;
        let word = db.word(word_ids[0])?.unwrap();
        assert_eq!(word.spelling, "abandon");
        assert_eq!(word.book_id, book_id);
        assert_eq!(word.frequency_rank, Some(3));
        assert!(db.word(9999)?.is_none());
        Ok(())
    }

    #[test]
    fn test_record_roundtrip() -> Fallible<()> {
        let (db, _, word_ids) = seeded()?;
        let policy = MasteryPolicy::default();
        let now = make_timestamp("2024-06-01T09:00:00.000");

        assert!(db.get_record(1, word_ids[0])?.is_none());
        assert_eq!(db.records_for_user(1)?.len(), 0);

        let record = LearningRecord::new(word_ids[0]);
        let record = update_record(&record, Quality::Good, &policy, now);
        assert!(db.persist_record(1, &record, 0)?);
        let loaded = db.get_record(1, word_ids[0])?.unwrap();
        assert_eq!(loaded, record);

        let record = update_record(&record, Quality::Again, &policy, now.plus_days(1));
        assert!(db.persist_record(1, &record, 1)?);
        let loaded = db.get_record(1, word_ids[0])?.unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.history.len(), 2);

        assert_eq!(db.records_for_user(1)?.len(), 1);
        // Records belong to one user.
        assert_eq!(db.records_for_user(2)?.len(), 0);
        Ok(())
    }

    #[test]
    fn test_persist_version_conflict() -> Fallible<()> {
        let (db, _, word_ids) = seeded()?;
        let policy = MasteryPolicy::default();
        let now = make_timestamp("2024-06-01T09:00:00.000");

        let base = LearningRecord::new(word_ids[0]);
        let first = update_record(&base, Quality::Good, &policy, now);
        assert!(db.persist_record(1, &first, 0)?);

        // A second first-review of the same word loses the race.
        let rival = update_record(&base, Quality::Easy, &policy, now);
        assert!(!db.persist_record(1, &rival, 0)?);

        // An update computed from a stale version is rejected.
        let second = update_record(&first, Quality::Good, &policy, now.plus_days(1));
        assert!(db.persist_record(1, &second, 1)?);
        assert!(!db.persist_record(1, &second, 1)?);

        // The committed state is the winners' sequence.
        let loaded = db.get_record(1, word_ids[0])?.unwrap();
        assert_eq!(loaded.total_reviews, 2);
        Ok(())
    }

    #[test]
    fn test_new_candidates_ordering_and_exclusion() -> Fallible<()> {
        let (db, book_id, word_ids) = seeded()?;
        // Ranked words first (rank 1, then 3), unranked last.
        let candidates = db.new_candidates(1, book_id, 10)?;
        let ids: Vec<WordId> = candidates.iter().map(|c| c.word_id).collect();
        assert_eq!(ids, vec![word_ids[1], word_ids[0], word_ids[2]]);

        // A recorded word drops out of the candidate set.
        let policy = MasteryPolicy::default();
        let now = make_timestamp("2024-06-01T09:00:00.000");
        let record = update_record(
            &LearningRecord::new(word_ids[1]),
            Quality::Good,
            &policy,
            now,
        );
        assert!(db.persist_record(1, &record, 0)?);
        let candidates = db.new_candidates(1, book_id, 10)?;
        let ids: Vec<WordId> = candidates.iter().map(|c| c.word_id).collect();
        assert_eq!(ids, vec![word_ids[0], word_ids[2]]);

        // But only for that user.
        assert_eq!(db.new_candidates(2, book_id, 10)?.len(), 3);

        // The limit caps the supply.
        assert_eq!(db.new_candidates(2, book_id, 1)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_active_plan() -> Fallible<()> {
        let (db, book_id, _) = seeded()?;
        assert!(db.active_plan(1)?.is_none());

        db.set_active_plan(1, book_id, "morning drill", 20, 100)?;
        let plan = db.active_plan(1)?.unwrap();
        assert_eq!(plan.book_id, book_id);
        assert_eq!(plan.daily_new, 20);
        assert_eq!(plan.daily_review, 100);

        // A new plan replaces the active one.
        let other = db.insert_book("CET-6")?;
        db.set_active_plan(1, other, "evening drill", 10, 50)?;
        let plan = db.active_plan(1)?.unwrap();
        assert_eq!(plan.book_id, other);

        // Plans are per-user.
        assert!(db.active_plan(2)?.is_none());
        Ok(())
    }
}
