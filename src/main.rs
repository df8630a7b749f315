use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_catalog::infrastructure::AppState;
use book_catalog::{config, db, seed, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db_with_pool(&config.database_url, config.database_max_connections).await?;
    let state = AppState::new(db);

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        match seed::seed_demo_data(&state).await {
            Ok(true) => tracing::info!("Demo data seeded successfully."),
            Ok(false) => tracing::info!("Authors already present, skipping demo data."),
            Err(e) => tracing::error!("Failed to seed data: {}", e),
        }
    }

    server::serve(state, &config).await?;

    Ok(())
}
