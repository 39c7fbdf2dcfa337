use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use movies_core::domain::{MovieInfo, MovieInfoId};
use movies_core::ports::{MovieInfoRepository, MovieInfoStream, RepoError};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::document::{ID, document_with_key, from_document, id_filter, name_filter, to_document, year_filter};

/// `MovieInfoRepository` backed by a MongoDB collection.
///
/// The handle owns its client; cloning it is cheap and shares the driver's
/// connection pool. No global client is kept anywhere.
#[derive(Clone)]
pub struct MongoMovieInfoRepository {
  client: Client,
  collection: Collection<Document>,
}

impl MongoMovieInfoRepository {
  /// Builds the client from `cfg` and pings the server once, so an unreachable
  /// database is reported here instead of on the first query.
  pub async fn connect(cfg: &StorageConfig) -> Result<Self, RepoError> {
    let mut options = ClientOptions::parse(&cfg.uri).await.map_err(unavailable)?;
    options.server_selection_timeout = Some(cfg.server_selection_timeout());
    options.app_name.get_or_insert_with(|| "movies".to_string());

    let client = Client::with_options(options).map_err(unavailable)?;
    let repo = Self::from_client(client, &cfg.database, &cfg.collection);
    repo.ping().await?;

    info!(database = %cfg.database, collection = %cfg.collection, "connected to mongodb");
    Ok(repo)
  }

  /// Wraps an existing client without touching the network.
  pub fn from_client(client: Client, database: &str, collection: &str) -> Self {
    let collection = client.database(database).collection::<Document>(collection);
    Self { client, collection }
  }

  pub async fn ping(&self) -> Result<(), RepoError> {
    let db = self.client.database(self.collection.namespace().db.as_str());
    db.run_command(doc! { "ping": 1 }).await.map_err(unavailable)?;
    Ok(())
  }

  pub fn collection(&self) -> &Collection<Document> {
    &self.collection
  }

  /// Drops the whole collection, indexes included.
  pub async fn drop_collection(&self) -> Result<(), RepoError> {
    self.collection.drop().await.map_err(unavailable)?;
    info!(collection = %self.collection.name(), "collection dropped");
    Ok(())
  }

  /// Raw `_id` of the document `id` addresses, if there is one.
  async fn stored_key(&self, id: &MovieInfoId) -> Result<Option<Bson>, RepoError> {
    let found = self.collection.find_one(id_filter(id)).projection(doc! { ID: 1 }).await.map_err(unavailable)?;
    Ok(found.and_then(|doc| doc.get(ID).cloned()))
  }

  async fn query(&self, filter: Document) -> Result<MovieInfoStream, RepoError> {
    debug!(collection = %self.collection.name(), ?filter, "find");
    let cursor = self.collection.find(filter).await.map_err(unavailable)?;

    Ok(cursor.map(|res| res.map_err(unavailable).and_then(|doc| from_document(&doc))).boxed())
  }
}

#[async_trait]
impl MovieInfoRepository for MongoMovieInfoRepository {
  async fn find_all(&self) -> Result<MovieInfoStream, RepoError> {
    self.query(doc! {}).await
  }

  async fn find_by_id(&self, id: &MovieInfoId) -> Result<Option<MovieInfo>, RepoError> {
    let found = self.collection.find_one(id_filter(id)).await.map_err(unavailable)?;
    found.map(|doc| from_document(&doc)).transpose()
  }

  async fn find_by_year(&self, year: i32) -> Result<MovieInfoStream, RepoError> {
    self.query(year_filter(year)).await
  }

  async fn find_by_name(&self, name: &str) -> Result<MovieInfoStream, RepoError> {
    self.query(name_filter(name)).await
  }

  async fn save(&self, mut movie: MovieInfo) -> Result<MovieInfo, RepoError> {
    match movie.id.clone() {
      None => {
        let id = MovieInfoId::new();
        self.collection.insert_one(to_document(&id, &movie)).await.map_err(unavailable)?;
        debug!(%id, "movie info inserted");
        movie.id = Some(id);
      }
      Some(id) => {
        let key = self.stored_key(&id).await?.unwrap_or_else(|| Bson::String(id.as_str().to_owned()));
        let res = self
          .collection
          .replace_one(doc! { ID: key.clone() }, document_with_key(key, &movie))
          .upsert(true)
          .await
          .map_err(unavailable)?;
        debug!(%id, matched = res.matched_count, upserted = res.upserted_id.is_some(), "movie info replaced");
      }
    }

    Ok(movie)
  }

  async fn delete_by_id(&self, id: &MovieInfoId) -> Result<(), RepoError> {
    let res = self.collection.delete_one(id_filter(id)).await.map_err(unavailable)?;
    debug!(%id, deleted = res.deleted_count, "movie info delete");
    Ok(())
  }

  async fn delete_all(&self) -> Result<(), RepoError> {
    let res = self.collection.delete_many(doc! {}).await.map_err(unavailable)?;
    debug!(deleted = res.deleted_count, "deleted all movie infos");
    Ok(())
  }

  async fn count(&self) -> Result<u64, RepoError> {
    self.collection.count_documents(doc! {}).await.map_err(unavailable)
  }
}

fn unavailable(err: mongodb::error::Error) -> RepoError {
  warn!(error = %err, "mongodb operation failed");
  RepoError::Unavailable(err.to_string())
}
