pub mod movie_info_service;

pub use movie_info_service::{MovieInfoService, ServiceStream};
