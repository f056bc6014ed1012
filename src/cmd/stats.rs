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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;

use vocabdrill_core::stats::study_stats;
use vocabdrill_core::types::aliases::UserId;
use vocabdrill_core::types::timestamp::Timestamp;

use crate::db::Database;
use crate::error::Fallible;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Plain text summary.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

/// Print study statistics for a user.
pub fn print_stats(database: &str, user_id: UserId, format: StatsFormat) -> Fallible<()> {
    let db = Database::open(database)?;
    let records = db.records_for_user(user_id)?;
    let stats = study_stats(&records, Timestamp::now());
    match format {
        StatsFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsFormat::Text => {
            println!("Words tracked:  {}", stats.total_words);
            println!("Mastered:       {}", stats.mastered);
            println!("Learning:       {}", stats.learning);
            println!("New:            {}", stats.new_words);
            println!("Due now:        {}", stats.due_now);
            println!("Accuracy:       {:.1}%", stats.accuracy * 100.0);
        }
    }
    Ok(())
}
