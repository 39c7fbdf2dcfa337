// crates/movies-core/src/errors.rs
use thiserror::Error;

use crate::domain::ValidationError;
use crate::ports::RepoError;

/// Error genérico del núcleo.
///
/// "No encontrado" no es un error: las búsquedas devuelven `None` o un
/// stream vacío.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("repository error: {0}")]
  Repository(String),
}

impl From<RepoError> for CoreError {
  fn from(err: RepoError) -> Self {
    match err {
      RepoError::Unavailable(msg) => CoreError::StorageUnavailable(msg),
      RepoError::Corrupt(msg) => CoreError::Repository(msg),
    }
  }
}

impl CoreError {
  pub fn is_validation(&self) -> bool {
    matches!(self, CoreError::Validation(_))
  }

  pub fn is_unavailable(&self) -> bool {
    matches!(self, CoreError::StorageUnavailable(_))
  }
}
