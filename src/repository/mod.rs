//! Database repository layer

pub mod role_repo;
pub mod user_repo;

pub use role_repo::*;
pub use user_repo::*;
