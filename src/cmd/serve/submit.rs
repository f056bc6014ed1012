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
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use vocabdrill_core::sm2::EaseFactor;
use vocabdrill_core::sm2::IntervalDays;
use vocabdrill_core::sm2::Quality;
use vocabdrill_core::types::aliases::UserId;
use vocabdrill_core::types::aliases::WordId;
use vocabdrill_core::types::record::LearningRecord;
use vocabdrill_core::types::record::update_record;
use vocabdrill_core::types::status::Status;
use vocabdrill_core::types::timestamp::Timestamp;

use crate::cmd::serve::server::internal;
use crate::cmd::serve::state::ServerState;
use crate::error::ErrorReport;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: UserId,
    pub word_id: WordId,
    /// Raw quality score; validated against the closed set {0, 3, 4, 5}.
    pub quality: u8,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub next_review_at: Timestamp,
    pub interval: IntervalDays,
    pub ease_factor: EaseFactor,
    pub status: Status,
}

/// Apply one review result and persist the successor record.
pub async fn submit_handler(
    State(state): State<ServerState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, String)> {
    let quality = Quality::try_from(request.quality)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let now = Timestamp::now();
    let db = state.db.lock().unwrap();
    let record = match db
        .get_record(request.user_id, request.word_id)
        .map_err(internal)?
    {
        Some(record) => record,
        None => {
            // First-ever review of this word: start from the default new
            // state, provided the word is actually in the catalog.
            if db.word(request.word_id).map_err(internal)?.is_none() {
                return Err((
                    StatusCode::NOT_FOUND,
                    format!("unknown word: {}", request.word_id),
                ));
            }
            LearningRecord::new(request.word_id)
        }
    };
    let prior_reviews = record.total_reviews;
    let updated = update_record(&record, quality, &state.mastery, now);
    let committed = db
        .persist_record(request.user_id, &updated, prior_reviews)
        .map_err(internal)?;
    if !committed {
        return Err((
            StatusCode::CONFLICT,
            "a concurrent submission updated this word, retry".to_string(),
        ));
    }
    let next_review_at = match updated.next_review_at {
        Some(at) => at,
        None => {
            return Err(internal(ErrorReport::new(
                "updated record has no next review time",
            )));
        }
    };

    log::debug!(
        "user {} reviewed word {} with quality {}: next review at {}",
        request.user_id,
        request.word_id,
        quality.score(),
        next_review_at
    );
    Ok(Json(SubmitResponse {
        next_review_at,
        interval: updated.interval_days,
        ease_factor: updated.ease_factor,
        status: updated.status,
    }))
}
