//! 数据模型模块
//! 角色/权限与用户是授权层的核心实体；其余业务实体由外部仓储协作方持有

pub mod auth;
pub mod role;
pub mod user;
