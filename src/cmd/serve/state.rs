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

use vocabdrill_core::types::status::MasteryPolicy;

use crate::db::Database;

/// Shared server state. The database connection is behind a mutex, which
/// also serializes the read-update-persist sequence for submissions; the
/// optimistic version check in the database is the backstop for deployments
/// with more than one writer.
#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<Mutex<Database>>,
    pub mastery: MasteryPolicy,
    pub default_limit: usize,
}
