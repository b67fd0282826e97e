//! Business logic services layer

pub mod identity_service;
pub mod permission_service;
pub mod role_service;

pub use identity_service::IdentityResolver;
pub use permission_service::PermissionService;
pub use role_service::RoleService;
