pub mod auth;
pub mod error;
pub mod query;

pub use auth::{Role, User};
pub use error::AppError;
pub use query::SortDirection;
