//! Database migration runner for Payplan.
//!
//! Usage:
//!   migrator up      - Create the planning schema
//!   migrator down    - Drop the planning schema
//!   migrator status  - Show migration status

use sea_orm_migration::prelude::*;
use payplan_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // run_cli sets up its own tracing
    cli::run_cli(Migrator).await;
}
