//! Authentication module

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{auth_middleware, extract_token, optional_auth_middleware};
pub use password::PasswordHasher;
