//! HTTP 处理器模块

pub mod auth;
pub mod events;
pub mod health;
pub mod metrics;
pub mod permission;
pub mod role;
pub mod user;
