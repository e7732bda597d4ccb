//! 认证模块 - JWT 认证与密码哈希
//!
//! # 模块结构
//!
//! - [`jwt`] - JWT 令牌生成与验证
//! - [`middleware`] - Axum 认证中间件
//! - [`password`] - Argon2 密码哈希

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use password::{hash_password, verify_password};
