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

use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::signal;

use vocabdrill_core::types::status::MasteryPolicy;

use crate::cmd::serve::session::session_handler;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::stats::stats_handler;
use crate::cmd::serve::submit::submit_handler;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub default_limit: usize,
    pub mastery: MasteryPolicy,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let db = Database::open(&config.database)?;
    let state = ServerState {
        db: Arc::new(Mutex::new(db)),
        mastery: config.mastery,
        default_limit: config.default_limit,
    };
    let app = Router::new();
    let app = app.route("/study/session", get(session_handler));
    let app = app.route("/study/submit", post(submit_handler));
    let app = app.route("/study/stats", get(stats_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn not_found_handler() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Not Found".to_string())
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    log::debug!("Received Ctrl+C, shutting down gracefully");
}

/// Map an internal failure to a 500 without leaking its message.
pub(crate) fn internal(e: ErrorReport) -> (StatusCode, String) {
    log::error!("{e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}
