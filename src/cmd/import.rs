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

use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

/// The on-disk shape of a book file.
#[derive(Debug, Deserialize)]
struct BookFile {
    name: String,
    words: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
struct WordEntry {
    spelling: String,
    definition: String,
    frequency_rank: Option<u32>,
}

/// Load a word book from a JSON file into the catalog.
pub fn import_book(file: &str, database: &str) -> Fallible<()> {
    let text = std::fs::read_to_string(file)?;
    let book: BookFile = serde_json::from_str(&text)?;
    if book.words.is_empty() {
        return fail(format!("book file {file} contains no words"));
    }
    let db = Database::open(database)?;
    let book_id = db.insert_book(&book.name)?;
    for word in &book.words {
        db.insert_word(book_id, &word.spelling, &word.definition, word.frequency_rank)?;
    }
    log::info!("imported book '{}' with {} words", book.name, book.words.len());
    println!(
        "Imported {} words into book '{}' (id {}).",
        book.words.len(),
        book.name,
        book_id
    );
    Ok(())
}
