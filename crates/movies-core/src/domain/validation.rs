use crate::domain::movie_info::MovieInfo;
use std::fmt;

pub const NAME_MUST_BE_PRESENT: &str = "movieInfo.name must be present";
pub const YEAR_MUST_BE_POSITIVE: &str = "movieInfo.year must be a Positive value";

/// Una regla incumplida sobre un campo concreto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
  pub field: &'static str,
  pub message: &'static str,
}

/// Todas las reglas incumplidas por un `MovieInfo`.
///
/// Nunca está vacío: `validate` sólo lo construye cuando hay al menos una
/// violación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
  violations: Vec<FieldViolation>,
}

impl ValidationError {
  pub fn violations(&self) -> &[FieldViolation] {
    &self.violations
  }

  /// `true` si alguna violación apunta a `field`.
  pub fn has_field(&self, field: &str) -> bool {
    self.violations.iter().any(|v| v.field == field)
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut messages: Vec<&str> = self.violations.iter().map(|v| v.message).collect();
    messages.sort_unstable();
    f.write_str(&messages.join(", "))
  }
}

impl std::error::Error for ValidationError {}

/// Valida un `MovieInfo` antes de persistirlo.
///
/// - `name` no puede estar vacío ni ser sólo espacios.
/// - `year` debe ser > 0.
///
/// Se acumulan todas las violaciones en lugar de cortar en la primera.
pub fn validate(movie: &MovieInfo) -> Result<(), ValidationError> {
  let mut violations = Vec::new();

  if movie.name.trim().is_empty() {
    violations.push(FieldViolation { field: "name", message: NAME_MUST_BE_PRESENT });
  }

  if movie.year <= 0 {
    violations.push(FieldViolation { field: "year", message: YEAR_MUST_BE_POSITIVE });
  }

  if violations.is_empty() { Ok(()) } else { Err(ValidationError { violations }) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn movie(name: &str, year: i32) -> MovieInfo {
    MovieInfo::new(name, year, vec![], None)
  }

  #[test]
  fn accepts_a_named_movie_with_positive_year() {
    assert!(validate(&movie("The Dark Knight", 2008)).is_ok());
  }

  #[test]
  fn rejects_blank_name() {
    let err = validate(&movie("   ", 2008)).unwrap_err();

    assert!(err.has_field("name"));
    assert!(!err.has_field("year"));
    assert_eq!(err.to_string(), NAME_MUST_BE_PRESENT);
  }

  #[test]
  fn rejects_zero_and_negative_years() {
    for year in [0, -1] {
      let err = validate(&movie("Batman Begins", year)).unwrap_err();
      assert_eq!(err.violations(), &[FieldViolation { field: "year", message: YEAR_MUST_BE_POSITIVE }]);
    }
  }

  #[test]
  fn reports_every_violation_sorted() {
    let err = validate(&movie("", -1)).unwrap_err();

    assert_eq!(err.violations().len(), 2);
    assert_eq!(
      err.to_string(),
      "movieInfo.name must be present, movieInfo.year must be a Positive value"
    );
  }
}
