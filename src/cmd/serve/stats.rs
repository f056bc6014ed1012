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

use vocabdrill_core::stats::StudyStats;
use vocabdrill_core::stats::study_stats;
use vocabdrill_core::types::aliases::UserId;
use vocabdrill_core::types::timestamp::Timestamp;

use crate::cmd::serve::server::internal;
use crate::cmd::serve::state::ServerState;

#[derive(Deserialize)]
pub struct StatsParams {
    pub user_id: UserId,
}

pub async fn stats_handler(
    State(state): State<ServerState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StudyStats>, (StatusCode, String)> {
    let now = Timestamp::now();
    let db = state.db.lock().unwrap();
    let records = db.records_for_user(params.user_id).map_err(internal)?;
    Ok(Json(study_stats(&records, now)))
}
