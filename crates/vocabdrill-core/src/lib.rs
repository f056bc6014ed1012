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

//! vocabdrill-core: Core library for the vocabdrill spaced repetition engine.
//!
//! This library provides the pure scheduling core:
//! - The SM-2 variant used to compute review intervals and ease factors
//! - The learning-record state machine and review update function
//! - Session assembly (mixing due reviews with new words)
//! - Study statistics
//!
//! Nothing here performs I/O or reads the clock: callers inject a
//! `Timestamp` and persist the returned values.

pub mod error;
pub mod session;
pub mod sm2;
pub mod stats;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use session::{NewCandidate, Session, StudyPlanConfig, assemble};
pub use sm2::{InvalidQualityScore, Quality};
pub use stats::{StudyStats, study_stats};
pub use types::record::{LearningRecord, ReviewEntry, update_record};
pub use types::status::{MasteryPolicy, Status};
pub use types::timestamp::Timestamp;
