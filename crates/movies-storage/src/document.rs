//! Explicit `MovieInfo` <-> BSON mapping.
//!
//! Field names are spelled out here once; both adapters and any ad-hoc query
//! must go through these constants instead of relying on derived serde names.
//!
//! | struct field   | document key   | BSON type                          |
//! |----------------|----------------|------------------------------------|
//! | `id`           | `_id`          | string (ObjectId accepted on read) |
//! | `name`         | `name`         | string                             |
//! | `year`         | `year`         | int32 (int64 accepted on read)     |
//! | `cast`         | `cast`         | array of strings (missing = empty) |
//! | `release_date` | `release_date` | `YYYY-MM-DD` string, or null       |
//!
//! Documents written by other tools may carry `release_date` as a BSON date;
//! those are read back as the UTC calendar day. An ObjectId `_id` surfaces as
//! its hex string, and [`id_filter`] matches that string against both stored
//! representations. Unknown keys (e.g. `_class`) are ignored.

use chrono::{DateTime, NaiveDate};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use movies_core::domain::{MovieInfo, MovieInfoId};
use movies_core::ports::RepoError;

pub const ID: &str = "_id";
pub const NAME: &str = "name";
pub const YEAR: &str = "year";
pub const CAST: &str = "cast";
pub const RELEASE_DATE: &str = "release_date";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the stored form of `movie` under `id`. The id inside `movie` is ignored.
pub fn to_document(id: &MovieInfoId, movie: &MovieInfo) -> Document {
  document_with_key(Bson::String(id.as_str().to_owned()), movie)
}

/// Same as [`to_document`] but with the raw `_id` value, so a replace keeps
/// whatever representation the stored document already has.
pub fn document_with_key(key: Bson, movie: &MovieInfo) -> Document {
  doc! {
    ID: key,
    NAME: movie.name.as_str(),
    YEAR: movie.year,
    CAST: movie.cast.clone(),
    RELEASE_DATE: movie.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
  }
}

/// Ids that parse as an ObjectId may be stored either way.
pub fn id_filter(id: &MovieInfoId) -> Document {
  match ObjectId::parse_str(id.as_str()) {
    Ok(oid) => doc! { ID: { "$in": [oid, id.as_str()] } },
    Err(_) => doc! { ID: id.as_str() },
  }
}

pub fn year_filter(year: i32) -> Document {
  doc! { YEAR: year }
}

pub fn name_filter(name: &str) -> Document {
  doc! { NAME: name }
}

pub fn from_document(doc: &Document) -> Result<MovieInfo, RepoError> {
  let id = match doc.get(ID) {
    Some(Bson::String(s)) => MovieInfoId::from(s.as_str()),
    Some(Bson::ObjectId(oid)) => MovieInfoId::from(oid.to_hex()),
    Some(other) => return Err(corrupt(ID, "string id", other)),
    None => return Err(RepoError::Corrupt(format!("document without `{ID}`"))),
  };

  let name = match doc.get(NAME) {
    Some(Bson::String(s)) => s.clone(),
    Some(other) => return Err(corrupt(NAME, "string", other)),
    None => return Err(missing(&id, NAME)),
  };

  let year = match doc.get(YEAR) {
    Some(Bson::Int32(y)) => *y,
    Some(Bson::Int64(y)) => i32::try_from(*y)
      .map_err(|_| RepoError::Corrupt(format!("`{YEAR}` out of range in {id}: {y}")))?,
    Some(other) => return Err(corrupt(YEAR, "int32", other)),
    None => return Err(missing(&id, YEAR)),
  };

  let cast = match doc.get(CAST) {
    None | Some(Bson::Null) => Vec::new(),
    Some(Bson::Array(items)) => items
      .iter()
      .map(|item| match item {
        Bson::String(s) => Ok(s.clone()),
        other => Err(corrupt(CAST, "array of strings", other)),
      })
      .collect::<Result<Vec<_>, _>>()?,
    Some(other) => return Err(corrupt(CAST, "array", other)),
  };

  let release_date = match doc.get(RELEASE_DATE) {
    None | Some(Bson::Null) => None,
    Some(Bson::String(s)) => Some(
      NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| RepoError::Corrupt(format!("`{RELEASE_DATE}` in {id}: {e}")))?,
    ),
    Some(Bson::DateTime(dt)) => Some(
      DateTime::from_timestamp_millis(dt.timestamp_millis())
        .map(|utc| utc.date_naive())
        .ok_or_else(|| RepoError::Corrupt(format!("`{RELEASE_DATE}` out of range in {id}")))?,
    ),
    Some(other) => return Err(corrupt(RELEASE_DATE, "date string", other)),
  };

  Ok(MovieInfo { id: Some(id), name, year, cast, release_date })
}

fn corrupt(field: &str, expected: &str, found: &Bson) -> RepoError {
  RepoError::Corrupt(format!("`{field}`: expected {expected}, found {:?}", found.element_type()))
}

fn missing(id: &MovieInfoId, field: &str) -> RepoError {
  RepoError::Corrupt(format!("document {id} has no `{field}`"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use mongodb::bson::DateTime as BsonDateTime;

  fn rises() -> MovieInfo {
    MovieInfo::new(
      "Dark Knight Rises",
      2012,
      vec!["Christian Bale".into(), "Tom Hardy".into()],
      NaiveDate::from_ymd_opt(2012, 7, 20),
    )
  }

  #[test]
  fn writes_the_documented_layout() {
    let doc = to_document(&MovieInfoId::from("abc"), &rises());

    assert_eq!(doc.get_str(ID).unwrap(), "abc");
    assert_eq!(doc.get_i32(YEAR).unwrap(), 2012);
    assert_eq!(doc.get_str(RELEASE_DATE).unwrap(), "2012-07-20");
    assert_eq!(doc.get_array(CAST).unwrap().len(), 2);
  }

  #[test]
  fn reads_back_what_it_wrote_with_the_id_attached() {
    let id = MovieInfoId::from("abc");
    let back = from_document(&to_document(&id, &rises())).unwrap();

    assert_eq!(back, rises().with_id("abc"));
  }

  #[test]
  fn tolerates_foreign_writers() {
    let doc = doc! {
      "_id": "xyz",
      "_class": "com.reactivespring.domain.MovieInfo",
      "name": "Batman Begins",
      "year": 2005_i64,
      "release_date": BsonDateTime::from_millis(1_118_793_600_000),
    };

    let movie = from_document(&doc).unwrap();

    assert_eq!(movie.year, 2005);
    assert!(movie.cast.is_empty());
    assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2005, 6, 15));
  }

  #[test]
  fn id_filter_addresses_object_id_documents() {
    let stored = doc! { "_id": ObjectId::new(), "name": "Batman Begins", "year": 2005 };
    let id = from_document(&stored).unwrap().id.unwrap();

    let filter = id_filter(&id);
    let candidates = filter.get_document(ID).unwrap().get_array("$in").unwrap();

    assert!(candidates.contains(stored.get(ID).unwrap()));
    assert_eq!(id_filter(&MovieInfoId::from("abc")), doc! { "_id": "abc" });
  }

  #[test]
  fn replacement_keeps_the_stored_key() {
    let oid = ObjectId::new();
    let doc = document_with_key(Bson::ObjectId(oid), &rises());

    assert_eq!(doc.get_object_id(ID).unwrap(), oid);
    assert_eq!(doc.get_str(NAME).unwrap(), "Dark Knight Rises");
  }

  #[test]
  fn missing_or_mistyped_fields_are_corrupt() {
    let no_name = doc! { "_id": "a", "year": 2005 };
    let bad_year = doc! { "_id": "a", "name": "x", "year": "2005" };
    let bad_cast = doc! { "_id": "a", "name": "x", "year": 2005, "cast": [1, 2] };

    for doc in [no_name, bad_year, bad_cast] {
      assert!(matches!(from_document(&doc), Err(RepoError::Corrupt(_))), "{doc:?}");
    }
  }
}
