//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//!
//! Role definitions live in [`crate::tenancy::principal`]; authorization
//! decisions belong to the policy engine, never to ad-hoc role checks here.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
