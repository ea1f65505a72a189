//! Database migration runner for Strata.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Must run as a privileged role: the migrations install SECURITY DEFINER
//! functions and FORCE RLS, and the app role must NOT own the tables.

use sea_orm_migration::prelude::*;
use strata_db::migration::Migrator;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Run the migrator CLI (it sets up its own tracing)
    cli::run_cli(Migrator).await;
}
