//! 自由职业市场系统库
//! 提供共享类型和工具

pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod telemetry;
