use chrono::NaiveDate;
use futures::TryStreamExt;
use movies_config::TomlConfigBackend;
use movies_core::domain::MovieInfo;
use movies_core::ports::MovieInfoRepository;
use movies_storage::{MongoMovieInfoRepository, StorageConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  // Usa MOVIES_MONGODB_URI si la base no está en localhost
  let backend = TomlConfigBackend::detect().expect("failed to resolve config paths");
  let cfg = StorageConfig::load(&backend).expect("failed to load [storage] config");
  let repo = MongoMovieInfoRepository::connect(&cfg).await.expect("failed to connect");

  let movie = MovieInfo::new(
    "Batman Begins",
    2005,
    vec!["Christian Bale".into(), "Michael Cane".into()],
    NaiveDate::from_ymd_opt(2005, 6, 15),
  );

  let saved = repo.save(movie).await.expect("failed to save movie info");
  let id = saved.id.clone().expect("store did not assign an id");
  println!("Saved movie info with id = {id}");

  let loaded = repo.find_by_id(&id).await.expect("failed to load movie info");
  println!("Loaded from DB: {loaded:?}");

  let same_year: Vec<MovieInfo> =
    repo.find_by_year(2005).await.expect("query failed").try_collect().await.expect("cursor failed");
  println!("Movies from 2005: {}", same_year.len());

  repo.delete_by_id(&id).await.expect("failed to delete movie info");
  println!("Deleted {id}, {} left", repo.count().await.expect("count failed"));
}
