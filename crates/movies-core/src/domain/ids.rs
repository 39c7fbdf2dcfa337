use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identificador opaco de un `MovieInfo`.
///
/// El store lo asigna en el primer insert y no cambia después. Se guarda como
/// texto porque el documento lo persiste en `_id` tal cual; los ids generados
/// aquí son UUID v4, pero cualquier cadena que venga del llamador es válida.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieInfoId(String);

impl MovieInfoId {
  /// Genera un nuevo identificador único.
  pub fn new() -> Self {
    MovieInfoId(Uuid::new_v4().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for MovieInfoId {
  fn default() -> Self {
    Self::new()
  }
}

impl From<String> for MovieInfoId {
  fn from(s: String) -> Self {
    MovieInfoId(s)
  }
}

impl From<&str> for MovieInfoId {
  fn from(s: &str) -> Self {
    MovieInfoId(s.to_owned())
  }
}

impl From<MovieInfoId> for String {
  fn from(id: MovieInfoId) -> Self {
    id.0
  }
}

impl fmt::Display for MovieInfoId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
