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

use vocabdrill_core::types::aliases::BookId;
use vocabdrill_core::types::aliases::UserId;

use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

/// Create a study plan and make it the user's active one.
pub fn create_plan(
    database: &str,
    user_id: UserId,
    book_id: BookId,
    name: &str,
    daily_new: usize,
    daily_review: usize,
) -> Fallible<()> {
    let db = Database::open(database)?;
    let book_name = match db.book_name(book_id)? {
        Some(name) => name,
        None => return fail(format!("no book with id {book_id}")),
    };
    db.set_active_plan(user_id, book_id, name, daily_new, daily_review)?;
    println!(
        "Activated plan '{name}' for user {user_id}: book '{book_name}', \
         {daily_new} new and {daily_review} review words per session."
    );
    Ok(())
}
