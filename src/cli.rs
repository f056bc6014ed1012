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

use clap::Parser;

use crate::cmd::import::import_book;
use crate::cmd::plan::create_plan;
use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::start_server;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::config::load_config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Run the study API server.
    Serve {
        /// Path to the configuration file. By default, vocabdrill.toml is used if present.
        #[arg(long)]
        config: Option<String>,
        /// The host address to bind to. Overrides the configuration file.
        #[arg(long)]
        host: Option<String>,
        /// The port to listen on. Overrides the configuration file.
        #[arg(long)]
        port: Option<u16>,
        /// Path to the database file. Overrides the configuration file.
        #[arg(long)]
        database: Option<String>,
    },
    /// Import a word book from a JSON file into the catalog.
    Import {
        /// Path to the book file.
        file: String,
        /// Path to the database file. Default is vocabdrill.db.
        #[arg(long, default_value = "vocabdrill.db")]
        database: String,
    },
    /// Create and activate a study plan for a user.
    Plan {
        /// The user the plan belongs to.
        #[arg(long)]
        user: i64,
        /// The book new words are drawn from.
        #[arg(long)]
        book: i64,
        /// A display name for the plan.
        #[arg(long, default_value = "study plan")]
        name: String,
        /// Maximum new words per session.
        #[arg(long, default_value_t = 20)]
        daily_new: usize,
        /// Maximum review words per session.
        #[arg(long, default_value_t = 100)]
        daily_review: usize,
        /// Path to the database file. Default is vocabdrill.db.
        #[arg(long, default_value = "vocabdrill.db")]
        database: String,
    },
    /// Print study statistics for a user.
    Stats {
        /// The user to report on.
        #[arg(long)]
        user: i64,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Path to the database file. Default is vocabdrill.db.
        #[arg(long, default_value = "vocabdrill.db")]
        database: String,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            config,
            host,
            port,
            database,
        } => {
            let config = load_config(config.as_deref())?;
            let server_config = ServerConfig {
                host: host.unwrap_or(config.server.host),
                port: port.unwrap_or(config.server.port),
                database: database.unwrap_or(config.storage.database),
                default_limit: config.session.default_limit,
                mastery: config.mastery,
            };
            start_server(server_config).await
        }
        Command::Import { file, database } => import_book(&file, &database),
        Command::Plan {
            user,
            book,
            name,
            daily_new,
            daily_review,
            database,
        } => create_plan(&database, user, book, &name, daily_new, daily_review),
        Command::Stats {
            user,
            format,
            database,
        } => print_stats(&database, user, format),
    }
}
