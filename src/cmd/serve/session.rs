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

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use vocabdrill_core::session::assemble;
use vocabdrill_core::sm2::EaseFactor;
use vocabdrill_core::sm2::IntervalDays;
use vocabdrill_core::types::aliases::UserId;
use vocabdrill_core::types::aliases::WordId;
use vocabdrill_core::types::record::LearningRecord;
use vocabdrill_core::types::status::Status;
use vocabdrill_core::types::timestamp::Timestamp;

use crate::cmd::serve::server::internal;
use crate::cmd::serve::state::ServerState;
use crate::error::ErrorReport;

#[derive(Deserialize)]
pub struct SessionParams {
    pub user_id: UserId,
    /// Overall session size cap. Zero is a valid dry-run query.
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub words: Vec<SessionWord>,
    pub stats: SessionStats,
}

#[derive(Serialize)]
pub struct SessionWord {
    pub word_id: WordId,
    pub spelling: String,
    pub definition: String,
    pub progress: WordProgress,
}

#[derive(Serialize)]
pub struct WordProgress {
    pub status: Status,
    pub ease_factor: EaseFactor,
    pub interval: IntervalDays,
    pub total_reviews: u32,
    pub correct_count: u32,
}

impl WordProgress {
    fn from_record(record: &LearningRecord) -> Self {
        Self {
            status: record.status,
            ease_factor: record.ease_factor,
            interval: record.interval_days,
            total_reviews: record.total_reviews,
            correct_count: record.correct_count,
        }
    }
}

#[derive(Serialize)]
pub struct SessionStats {
    pub total_due: usize,
    pub review_count: usize,
    pub new_count: usize,
}

/// Assemble today's session for a user: due reviews first, then new words
/// from the active plan's book.
pub async fn session_handler(
    State(state): State<ServerState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let now = Timestamp::now();
    let limit = params.limit.unwrap_or(state.default_limit);
    let db = state.db.lock().unwrap();
    let records = db.records_for_user(params.user_id).map_err(internal)?;
    let plan = db.active_plan(params.user_id).map_err(internal)?;
    let candidates = match &plan {
        Some(plan) if plan.daily_new > 0 => db
            .new_candidates(params.user_id, plan.book_id, plan.daily_new)
            .map_err(internal)?,
        _ => Vec::new(),
    };
    let session = assemble(&records, &candidates, plan.as_ref(), now, limit);

    let mut words = Vec::with_capacity(session.entries.len());
    for record in &session.entries {
        let word = db.word(record.word_id).map_err(internal)?.ok_or_else(|| {
            internal(ErrorReport::new(format!(
                "progress row references unknown word {}",
                record.word_id
            )))
        })?;
        words.push(SessionWord {
            word_id: word.id,
            spelling: word.spelling,
            definition: word.definition,
            progress: WordProgress::from_record(record),
        });
    }

    log::debug!(
        "assembled session for user {}: {} review, {} new, {} due in total",
        params.user_id,
        session.review_count,
        session.new_count,
        session.total_due
    );
    Ok(Json(SessionResponse {
        words,
        stats: SessionStats {
            total_due: session.total_due,
            review_count: session.review_count,
            new_count: session.new_count,
        },
    }))
}
