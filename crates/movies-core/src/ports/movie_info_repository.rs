use async_trait::async_trait;
use futures::TryStreamExt;
use futures::stream::BoxStream;

use crate::domain::{MovieInfo, MovieInfoId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
  /// El store no responde o la operación no pudo completarse.
  #[error("storage unavailable: {0}")]
  Unavailable(String),
  /// Un documento guardado no se puede mapear a `MovieInfo`.
  #[error("corrupt document: {0}")]
  Corrupt(String),
}

/// Secuencia perezosa y finita de resultados de una consulta.
///
/// Cada elemento puede fallar por separado (cursor cortado, documento corrupto).
pub type MovieInfoStream = BoxStream<'static, Result<MovieInfo, RepoError>>;

/// Port de persistencia de `MovieInfo`.
///
/// Implementaciones:
/// - MongoDB (`movies-storage::MongoMovieInfoRepository`)
/// - en memoria, para tests y desarrollo local
///
/// No hay transacciones entre operaciones ni control optimista: dos `save`
/// concurrentes sobre el mismo id se resuelven como "gana el último".
#[async_trait]
pub trait MovieInfoRepository: Send + Sync {
  // --- Consultas ---
  async fn find_all(&self) -> Result<MovieInfoStream, RepoError>;
  async fn find_by_id(&self, id: &MovieInfoId) -> Result<Option<MovieInfo>, RepoError>;
  async fn find_by_year(&self, year: i32) -> Result<MovieInfoStream, RepoError>;
  /// Coincidencia exacta, sensible a mayúsculas.
  async fn find_by_name(&self, name: &str) -> Result<MovieInfoStream, RepoError>;

  // --- Comandos ---
  /// Sin id: inserta y asigna uno nuevo. Con id: reemplaza el documento
  /// entero (upsert si no existía).
  async fn save(&self, movie: MovieInfo) -> Result<MovieInfo, RepoError>;
  /// Borrar un id inexistente no es un error.
  async fn delete_by_id(&self, id: &MovieInfoId) -> Result<(), RepoError>;
  async fn delete_all(&self) -> Result<(), RepoError>;

  /// Guarda en orden y devuelve los registros persistidos en el mismo orden.
  async fn save_all(&self, movies: Vec<MovieInfo>) -> Result<Vec<MovieInfo>, RepoError> {
    let mut saved = Vec::with_capacity(movies.len());
    for movie in movies {
      saved.push(self.save(movie).await?);
    }
    Ok(saved)
  }

  async fn count(&self) -> Result<u64, RepoError> {
    let all: Vec<MovieInfo> = self.find_all().await?.try_collect().await?;
    Ok(all.len() as u64)
  }

  async fn exists_by_id(&self, id: &MovieInfoId) -> Result<bool, RepoError> {
    Ok(self.find_by_id(id).await?.is_some())
  }
}
