#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, NewProfile, Notifier, Principal, Role};
use migration::MigratorTrait;

pub async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = database().await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_notifier(notifier: Arc<dyn Notifier>) -> Engine {
    Engine::builder()
        .database(database().await)
        .notifier(notifier)
        .build()
        .await
        .unwrap()
}

pub async fn principal_with_role(engine: &Engine, name: &str, role: Role) -> Principal {
    let profile = engine
        .create_profile(NewProfile {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            ..Default::default()
        })
        .await
        .unwrap();
    engine.principal(&profile.id).await.unwrap()
}

pub async fn member(engine: &Engine, name: &str) -> Principal {
    principal_with_role(engine, name, Role::User).await
}

pub async fn admin(engine: &Engine, name: &str) -> Principal {
    principal_with_role(engine, name, Role::Admin).await
}

/// Two days from now at 08:00 UTC plus `hours`.
pub fn at(hours: i64) -> DateTime<Utc> {
    let base = (Utc::now() + Duration::days(2))
        .date_naive()
        .and_hms_opt(8, 0, 0)
        .unwrap()
        .and_utc();
    base + Duration::hours(hours)
}
