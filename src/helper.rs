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

//! Test helpers.

use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::time::sleep;

use vocabdrill_core::types::aliases::WordId;

use crate::db::Database;
use crate::error::Fallible;

/// A seeded database in a temporary directory. The directory is removed
/// when this is dropped.
pub struct TestDb {
    #[allow(dead_code)]
    dir: TempDir,
    pub path: String,
    pub word_ids: Vec<WordId>,
}

/// A database with one book of three words and an active plan for user 1.
pub fn create_seeded_db() -> Fallible<TestDb> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vocabdrill.db").display().to_string();
    let db = Database::open(&path)?;
    let book_id = db.insert_book("CET-4")?;
    let mut word_ids = Vec::new();
    word_ids.push(db.insert_word(book_id, "ability", "skill or talent", Some(1))?);
    word_ids.push(db.insert_word(book_id, "abandon", "to give up", Some(2))?);
    word_ids.push(db.insert_word(book_id, "abroad", "in a foreign country", Some(3))?);
    db.set_active_plan(1, book_id, "test plan", 20, 100)?;
    Ok(TestDb {
        dir,
        path,
        word_ids,
    })
}

pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
