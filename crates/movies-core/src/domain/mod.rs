pub mod ids;
pub mod movie_info;
pub mod validation;

pub use ids::MovieInfoId;
pub use movie_info::MovieInfo;
pub use validation::{FieldViolation, ValidationError, validate};
