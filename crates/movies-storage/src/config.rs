use movies_config::{ConfigBackend, ConfigError, TomlConfigBackend};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Env var that wins over whatever `[storage].uri` says.
pub const URI_ENV: &str = "MOVIES_MONGODB_URI";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
  /// MongoDB connection string.
  #[serde(default = "default_uri")]
  pub uri: String,

  #[serde(default = "default_database")]
  pub database: String,

  /// Collection holding the `MovieInfo` documents.
  #[serde(default = "default_collection")]
  pub collection: String,

  /// How long the driver waits for a usable server before giving up.
  #[serde(default = "default_server_selection_timeout_ms")]
  pub server_selection_timeout_ms: u64,
}

fn default_uri() -> String {
  "mongodb://localhost:27017".into()
}

fn default_database() -> String {
  "movies".into()
}

fn default_collection() -> String {
  "movieInfo".into()
}

fn default_server_selection_timeout_ms() -> u64 {
  2_000
}

impl Default for StorageConfig {
  fn default() -> Self {
    StorageConfig {
      uri: default_uri(),
      database: default_database(),
      collection: default_collection(),
      server_selection_timeout_ms: default_server_selection_timeout_ms(),
    }
  }
}

impl StorageConfig {
  /// Loads `[storage]` (falling back to defaults), writes it back so the user
  /// gets a filled-in section to edit, then applies the env override.
  pub fn load(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: StorageConfig = backend.load_section_with_default("storage")?;
    backend.save_section("storage", &cfg)?;
    Ok(cfg.with_env_override())
  }

  pub fn save(&self, backend: &TomlConfigBackend) -> Result<(), ConfigError> {
    backend.save_section("storage", self)
  }

  pub fn with_env_override(mut self) -> Self {
    if let Ok(uri) = std::env::var(URI_ENV) {
      if !uri.trim().is_empty() {
        self.uri = uri;
      }
    }
    self
  }

  pub fn server_selection_timeout(&self) -> Duration {
    Duration::from_millis(self.server_selection_timeout_ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use movies_config::MoviesPaths;
  use tempfile::tempdir;

  #[test]
  fn defaults_match_the_local_mongo_setup() {
    let cfg = StorageConfig::default();

    assert_eq!(cfg.uri, "mongodb://localhost:27017");
    assert_eq!(cfg.collection, "movieInfo");
    assert_eq!(cfg.server_selection_timeout(), Duration::from_secs(2));
  }

  #[test]
  fn partial_section_is_completed_with_defaults() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(MoviesPaths::from_base(tmp.path()).unwrap());
    std::fs::write(backend.config_file(), "[storage]\ndatabase = \"movies_test\"\n").unwrap();

    let cfg: StorageConfig = backend.load_section_with_default("storage").unwrap();

    assert_eq!(cfg.database, "movies_test");
    assert_eq!(cfg.collection, "movieInfo");
  }

  #[test]
  fn load_writes_the_section_back() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(MoviesPaths::from_base(tmp.path()).unwrap());

    StorageConfig::load(&backend).unwrap();

    let stored: StorageConfig = backend.load_section("storage").unwrap();
    assert_eq!(stored.database, "movies");
  }
}
