//! Payplan API Server
//!
//! Main entry point for the paycheck planning service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payplan_api::{AppState, create_router};
use payplan_core::planning::PlanningService;
use payplan_db::{PlanningRepository, connect_with};
use payplan_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payplan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    let planning = PlanningService::new(Arc::new(PlanningRepository::new(db)), config.planning);
    info!(
        max_lookahead_months = config.planning.max_lookahead_months,
        default_lookahead_months = config.planning.default_lookahead_months,
        "Planning service configured"
    );

    let app = create_router(AppState::new(planning, jwt_service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
