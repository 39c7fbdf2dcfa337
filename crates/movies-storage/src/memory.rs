//! In-memory `MovieInfoRepository`.
//!
//! Same contract as the MongoDB adapter, no external dependencies. Meant for
//! tests and local runs without a database; nothing survives the process.
//!
//! Query streams are snapshots taken when the query is issued: writes that
//! happen while a caller is still draining a stream are not observed.

use async_trait::async_trait;
use futures::StreamExt;
use movies_core::domain::{MovieInfo, MovieInfoId};
use movies_core::ports::{MovieInfoRepository, MovieInfoStream, RepoError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Thread-safe in-memory store; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMovieInfoRepository {
  rows: Arc<RwLock<HashMap<MovieInfoId, MovieInfo>>>,
}

impl InMemoryMovieInfoRepository {
  pub fn new() -> Self {
    Self::default()
  }

  async fn snapshot(&self, pred: impl Fn(&MovieInfo) -> bool) -> MovieInfoStream {
    let rows = self.rows.read().await;
    let matched: Vec<Result<MovieInfo, RepoError>> =
      rows.values().filter(|m| pred(m)).cloned().map(Ok).collect();
    trace!(matched = matched.len(), "in-memory query");
    futures::stream::iter(matched).boxed()
  }
}

#[async_trait]
impl MovieInfoRepository for InMemoryMovieInfoRepository {
  async fn find_all(&self) -> Result<MovieInfoStream, RepoError> {
    Ok(self.snapshot(|_| true).await)
  }

  async fn find_by_id(&self, id: &MovieInfoId) -> Result<Option<MovieInfo>, RepoError> {
    Ok(self.rows.read().await.get(id).cloned())
  }

  async fn find_by_year(&self, year: i32) -> Result<MovieInfoStream, RepoError> {
    Ok(self.snapshot(|m| m.year == year).await)
  }

  async fn find_by_name(&self, name: &str) -> Result<MovieInfoStream, RepoError> {
    Ok(self.snapshot(|m| m.name == name).await)
  }

  async fn save(&self, mut movie: MovieInfo) -> Result<MovieInfo, RepoError> {
    let id = movie.id.get_or_insert_with(MovieInfoId::new).clone();
    let replaced = self.rows.write().await.insert(id.clone(), movie.clone()).is_some();
    debug!(%id, replaced, "movie info saved");
    Ok(movie)
  }

  async fn delete_by_id(&self, id: &MovieInfoId) -> Result<(), RepoError> {
    let removed = self.rows.write().await.remove(id).is_some();
    debug!(%id, removed, "movie info delete");
    Ok(())
  }

  async fn delete_all(&self) -> Result<(), RepoError> {
    let mut rows = self.rows.write().await;
    debug!(removed = rows.len(), "deleting all movie infos");
    rows.clear();
    Ok(())
  }

  async fn count(&self) -> Result<u64, RepoError> {
    Ok(self.rows.read().await.len() as u64)
  }
}
