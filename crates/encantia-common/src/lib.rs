pub mod errors;
pub mod id;

pub use errors::{ConfigError, EncantiaError};
pub use id::{new_id, UserId};

pub type Result<T> = std::result::Result<T, EncantiaError>;
