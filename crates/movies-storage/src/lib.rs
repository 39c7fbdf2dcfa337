pub mod config;
pub mod document;
pub mod memory;
pub mod mongo;

pub use config::StorageConfig;
pub use memory::InMemoryMovieInfoRepository;
pub use mongo::MongoMovieInfoRepository;
