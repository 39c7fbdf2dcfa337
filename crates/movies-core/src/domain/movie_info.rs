use crate::domain::ids::MovieInfoId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// La ficha de una película tal y como se guarda en el document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInfo {
  /// `None` hasta el primer `save`; después lo fija el store y no cambia.
  pub id: Option<MovieInfoId>,
  /// Título. No puede quedar en blanco tras validar.
  pub name: String,
  /// Año de estreno, estrictamente positivo.
  pub year: i32,
  /// Reparto en orden de créditos. El orden importa para mostrarlo,
  /// no para la identidad.
  pub cast: Vec<String>,
  /// Fecha de estreno (sin hora).
  pub release_date: Option<NaiveDate>,
}

impl MovieInfo {
  /// Crea una ficha todavía sin persistir (`id = None`).
  pub fn new(
    name: impl Into<String>,
    year: i32,
    cast: Vec<String>,
    release_date: Option<NaiveDate>,
  ) -> Self {
    Self { id: None, name: name.into(), year, cast, release_date }
  }

  pub fn with_id(mut self, id: impl Into<MovieInfoId>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn is_persisted(&self) -> bool {
    self.id.is_some()
  }

  /// Reemplaza todos los campos salvo el id (semántica de "full replace").
  pub fn replace_fields(&mut self, other: MovieInfo) {
    self.name = other.name;
    self.year = other.year;
    self.cast = other.cast;
    self.release_date = other.release_date;
  }
}
