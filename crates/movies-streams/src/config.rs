use movies_config::{ConfigBackend, ConfigError, TomlConfigBackend};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SamplerConfig {
  /// Maximum number of inner streams a `WorkerPool` drives at once.
  #[serde(default = "default_max_concurrency")]
  pub max_concurrency: usize,

  /// Upper bound (exclusive) for the random per-string delay used by the
  /// async flat-map sample.
  #[serde(default = "default_max_split_delay_ms")]
  pub max_split_delay_ms: u64,
}

fn default_max_concurrency() -> usize {
  4
}

fn default_max_split_delay_ms() -> u64 {
  1_000
}

impl Default for SamplerConfig {
  fn default() -> Self {
    SamplerConfig {
      max_concurrency: default_max_concurrency(),
      max_split_delay_ms: default_max_split_delay_ms(),
    }
  }
}

impl SamplerConfig {
  pub fn load(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_with_default("sampler")?;
    backend.save_section("sampler", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self, backend: &TomlConfigBackend) -> Result<(), ConfigError> {
    backend.save_section("sampler", self)
  }

  pub fn max_split_delay(&self) -> Duration {
    Duration::from_millis(self.max_split_delay_ms)
  }
}
