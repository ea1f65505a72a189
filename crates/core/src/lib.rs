//! Core domain logic for Strata.
//!
//! This crate contains pure domain logic with ZERO web or database dependencies.
//! The tenant-isolation model lives here: every authorization decision the
//! platform makes is expressible (and unit-testable) against these types.
//!
//! # Modules
//!
//! - `tenancy` - Tenant context, policy predicates, context resolution, audit events
//! - `auth` - Password hashing

pub mod auth;
pub mod tenancy;
