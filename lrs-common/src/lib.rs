//! # LRS Common Library
//!
//! Shared code for the lecture reporting workspace:
//! - Error type and result alias
//! - Database models and schema initialization
//! - Principal and role types forwarded by the authentication layer
//! - Bootstrap configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod principal;

pub use error::{Error, Result};
pub use principal::{Principal, Role};
