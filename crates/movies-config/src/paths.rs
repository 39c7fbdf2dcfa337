use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("other: {0}")]
  Other(String),
}

/// Directorios por usuario donde vive la config.
#[derive(Debug, Clone)]
pub struct MoviesPaths {
  pub base_dir: PathBuf,
  pub config_dir: PathBuf,
}

impl MoviesPaths {
  /// Resuelve los directorios y los crea si no existen.
  ///
  /// `MOVIES_BASE_DIR` fuerza un layout portable (`config/` bajo esa ruta); si no está, se usan los directorios estándar del sistema.
  pub fn new() -> Result<Self, ConfigError> {
    if let Ok(env_base) = std::env::var("MOVIES_BASE_DIR") {
      return Self::from_base(env_base);
    }

    let proj_dirs = ProjectDirs::from("com", "movies", "movies").ok_or(ConfigError::Directories)?;
    let paths = Self {
      base_dir: proj_dirs.config_dir().to_path_buf(),
      config_dir: proj_dirs.config_dir().to_path_buf(),
    };
    paths.ensure_dirs()?;

    Ok(paths)
  }

  /// Layout portable bajo `base`.
  pub fn from_base(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let base = base.as_ref().to_path_buf();
    let paths = Self { config_dir: base.join("config"), base_dir: base };
    paths.ensure_dirs()?;

    Ok(paths)
  }

  pub fn detect() -> Result<Self, ConfigError> {
    Self::new()
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join("movies.toml")
  }

  fn ensure_dirs(&self) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&self.config_dir)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  struct EnvVarGuard {
    key: String,
    original: Option<String>,
  }

  impl EnvVarGuard {
    fn new(key: &str, value: &str) -> Self {
      let original = std::env::var(key).ok();
      unsafe { std::env::set_var(key, value) };
      EnvVarGuard { key: key.to_owned(), original }
    }
  }

  impl Drop for EnvVarGuard {
    fn drop(&mut self) {
      match &self.original {
        Some(val) => unsafe { std::env::set_var(&self.key, val) },
        None => unsafe { std::env::remove_var(&self.key) },
      }
    }
  }

  #[test]
  fn test_movies_base_dir_override() {
    let tmp = tempdir().unwrap();
    let _env = EnvVarGuard::new("MOVIES_BASE_DIR", tmp.path().to_str().unwrap());

    let paths = MoviesPaths::new().unwrap();

    assert_eq!(paths.base_dir, tmp.path());
    assert_eq!(paths.config_dir, tmp.path().join("config"));

    assert!(paths.config_dir.exists());
    assert!(!tmp.path().join("data").exists());
    assert_eq!(paths.config_file(), tmp.path().join("config").join("movies.toml"));
  }
}
