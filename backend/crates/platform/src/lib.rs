//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id with tunable cost)
//! - Signed bearer tokens (HS256 JWT)
//! - Rate limiting infrastructure
//! - Client identification

pub mod client;
pub mod jwt;
pub mod password;
pub mod rate_limit;
