use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use crate::domain::{MovieInfo, MovieInfoId, validate};
use crate::errors::CoreError;
use crate::ports::MovieInfoRepository;

/// Stream de resultados ya traducidos a `CoreError`.
pub type ServiceStream = BoxStream<'static, Result<MovieInfo, CoreError>>;

/// Fachada sobre el repositorio: valida antes de escribir y traduce los
/// errores del port a la taxonomía del núcleo.
///
/// No reintenta nada. Si el store cae, el error sube tal cual al llamador.
pub struct MovieInfoService<R>
where
  R: MovieInfoRepository,
{
  repo: R,
  validate: bool,
}

impl<R> MovieInfoService<R>
where
  R: MovieInfoRepository,
{
  /// Servicio con validación activada.
  pub fn new(repo: R) -> Self {
    Self { repo, validate: true }
  }

  /// Servicio que escribe sin validar (útil para sembrar datos de prueba).
  pub fn without_validation(repo: R) -> Self {
    Self { repo, validate: false }
  }

  pub fn repository(&self) -> &R {
    &self.repo
  }

  fn check(&self, movie: &MovieInfo) -> Result<(), CoreError> {
    if self.validate {
      validate(movie)?;
    }
    Ok(())
  }

  // -------- COMMAND (write) --------

  pub async fn add_movie_info(&self, movie: MovieInfo) -> Result<MovieInfo, CoreError> {
    self.check(&movie)?;
    let saved = self.repo.save(movie).await?;
    debug!(id = ?saved.id, name = %saved.name, "movie info saved");
    Ok(saved)
  }

  /// Reemplaza los campos de un registro existente.
  ///
  /// Devuelve `Ok(None)` si el id no existe: actualizar algo ausente no es un
  /// error, simplemente no hay nada que devolver.
  pub async fn update_movie_info(
    &self,
    id: &MovieInfoId,
    updated: MovieInfo,
  ) -> Result<Option<MovieInfo>, CoreError> {
    self.check(&updated)?;

    let Some(mut stored) = self.repo.find_by_id(id).await? else {
      debug!(%id, "update skipped, movie info not found");
      return Ok(None);
    };

    stored.replace_fields(updated);
    let saved = self.repo.save(stored).await?;
    Ok(Some(saved))
  }

  pub async fn delete_movie_info(&self, id: &MovieInfoId) -> Result<(), CoreError> {
    self.repo.delete_by_id(id).await?;
    Ok(())
  }

  pub async fn delete_all(&self) -> Result<(), CoreError> {
    self.repo.delete_all().await?;
    Ok(())
  }

  // -------- QUERY (read) --------

  pub async fn get_all_movie_infos(&self) -> Result<ServiceStream, CoreError> {
    let stream = self.repo.find_all().await?;
    Ok(stream.map(|r| r.map_err(CoreError::from)).boxed())
  }

  pub async fn get_movie_info_by_id(&self, id: &MovieInfoId) -> Result<Option<MovieInfo>, CoreError> {
    Ok(self.repo.find_by_id(id).await?)
  }

  pub async fn get_movie_infos_by_year(&self, year: i32) -> Result<ServiceStream, CoreError> {
    let stream = self.repo.find_by_year(year).await?;
    Ok(stream.map(|r| r.map_err(CoreError::from)).boxed())
  }

  pub async fn get_movie_infos_by_name(&self, name: &str) -> Result<ServiceStream, CoreError> {
    let stream = self.repo.find_by_name(name).await?;
    Ok(stream.map(|r| r.map_err(CoreError::from)).boxed())
  }
}
