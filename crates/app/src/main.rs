use std::sync::Arc;

use engine::{LogNotifier, MoneyCents, Notifier};
use migration::{Migrator, MigratorTrait};
use server::{ServerState, TokenIdentity};
use settings::Database;

mod notifier;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fairway={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let notifier: Arc<dyn Notifier> = match settings.notifier {
        Some(config) => {
            tracing::info!("Found notifier settings...");
            Arc::new(notifier::WebhookNotifier::new(config.webhook_url, config.api_key))
        }
        None => Arc::new(LogNotifier),
    };

    let mut builder = engine::Engine::builder().database(db).notifier(notifier);
    if let Some(fee) = settings.booking.guest_fee_minor {
        builder = builder.guest_fee(MoneyCents::new(fee));
    }
    let engine = Arc::new(builder.build().await?);

    let state = ServerState {
        identity: Arc::new(TokenIdentity::new(engine.clone())),
        engine,
    };

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
