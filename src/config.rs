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

use std::path::Path;

use serde::Deserialize;

use vocabdrill_core::types::status::MasteryPolicy;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// The default configuration file, consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vocabdrill.toml";

/// Application configuration. Every field has a default, and the file
/// itself is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub session: SessionSection,
    pub mastery: MasteryPolicy,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub database: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            database: "vocabdrill.db".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Session size cap used when a request does not pass `limit`.
    pub default_limit: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

/// Load the configuration. An explicit path must exist; the default path is
/// optional and falls back to built-in defaults.
pub fn load_config(path: Option<&str>) -> Fallible<AppConfig> {
    match path {
        Some(path) => {
            if !Path::new(path).exists() {
                return fail(format!("configuration file does not exist: {path}"));
            }
            parse_config_file(path)
        }
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                parse_config_file(DEFAULT_CONFIG_FILE)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn parse_config_file(path: &str) -> Fallible<AppConfig> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|e| ErrorReport::new(format!("failed to parse {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.database, "vocabdrill.db");
        assert_eq!(config.session.default_limit, 20);
        assert_eq!(config.mastery.min_quality, 4);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load_config(Some("./derpherp.toml")).is_err());
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[server]\nport = 9100\n\n[mastery]\nmin_repetitions = 3")?;
        let path = file.path().display().to_string();
        let config = load_config(Some(&path))?;
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mastery.min_repetitions, 3);
        assert_eq!(config.mastery.min_quality, 4);
        assert_eq!(config.session.default_limit, 20);
        Ok(())
    }

    #[test]
    fn test_invalid_file() -> Fallible<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "this is not toml =")?;
        let path = file.path().display().to_string();
        assert!(load_config(Some(&path)).is_err());
        Ok(())
    }
}
