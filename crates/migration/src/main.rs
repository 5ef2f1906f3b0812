//! Applies or rolls back the Fairway schema.
//!
//! `migration [up|down [steps]|fresh|status]`, connecting to `DATABASE_URL`
//! (a local `fairway.db` by default).

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./fairway.db?mode=rwc";

enum Action {
    Up,
    Down(Option<u32>),
    Fresh,
    Status,
}

fn parse_action(mut args: impl Iterator<Item = String>) -> Result<Action, String> {
    let action = match args.next().as_deref() {
        None | Some("up") => Action::Up,
        Some("down") => {
            let steps = args
                .next()
                .map(|raw| raw.parse::<u32>().map_err(|_| format!("invalid step count: {raw}")))
                .transpose()?;
            Action::Down(steps.or(Some(1)))
        }
        Some("fresh") => Action::Fresh,
        Some("status") => Action::Status,
        Some(other) => return Err(format!("unknown command: {other}")),
    };
    Ok(action)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let action = match parse_action(std::env::args().skip(1)) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("Usage: migration [up|down [steps]|fresh|status]");
            std::process::exit(2);
        }
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match action {
        Action::Up => migration::Migrator::up(&db, None).await?,
        Action::Down(steps) => migration::Migrator::down(&db, steps).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
