pub mod movie_info_repository;

pub use movie_info_repository::{MovieInfoRepository, MovieInfoStream, RepoError};
