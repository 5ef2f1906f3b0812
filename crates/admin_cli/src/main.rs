use std::error::Error;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, NewProfile, Principal, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

/// Acts for the operator; the engine sees it as an admin.
const OPERATOR_ID: &str = "fairway_admin";

#[derive(Parser, Debug)]
#[command(name = "fairway_admin")]
#[command(about = "Admin utilities for Fairway (bootstrap profiles and access tokens)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./fairway.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    Profile(Profile),
    Token(Token),
    Ledger(Ledger),
}

#[derive(Args, Debug)]
struct Profile {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Create a profile and print its first access token.
    Create(ProfileCreateArgs),
    /// Change the role of a profile.
    Role(ProfileRoleArgs),
    /// Set or clear the membership expiry.
    Membership(ProfileMembershipArgs),
    List,
}

#[derive(Args, Debug)]
struct ProfileCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    /// Identity-provider id; a UUID is generated when missing.
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value = "user")]
    role: String,
}

#[derive(Args, Debug)]
struct ProfileRoleArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    role: String,
}

#[derive(Args, Debug)]
struct ProfileMembershipArgs {
    #[arg(long)]
    id: String,
    /// RFC 3339 timestamp; omit to clear.
    #[arg(long)]
    until: Option<String>,
}

#[derive(Args, Debug)]
struct Token {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a new access token for a profile.
    Issue(TokenArgs),
    /// Revoke every access token of a profile.
    Revoke(TokenArgs),
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct Ledger {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Show the current balance of a profile.
    Balance(LedgerBalanceArgs),
    /// Record a payment received at the desk, e.g. `--amount 15.00`.
    Payment(LedgerPaymentArgs),
    /// Bring the balance to an exact amount.
    Adjust(LedgerAdjustArgs),
}

#[derive(Args, Debug)]
struct LedgerBalanceArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct LedgerPaymentArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    amount: MoneyCents,
}

#[derive(Args, Debug)]
struct LedgerAdjustArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    target: MoneyCents,
    #[arg(long, default_value = "")]
    reason: String,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw.to_ascii_lowercase().as_str()).map_err(|err| err.to_string())
}

fn parse_until(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| format!("invalid timestamp {value}: {err}"))
    })
    .transpose()
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;
    let operator = Principal::new(OPERATOR_ID, Role::Admin);

    match cli.command {
        Command::Migrate => println!("database is up to date"),
        Command::Profile(Profile {
            command: ProfileCommand::Create(args),
        }) => {
            let role = match parse_role(&args.role) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let profile = engine
                .create_profile(NewProfile {
                    id: args.id,
                    name: args.name,
                    email: args.email,
                    phone: args.phone,
                    role,
                    active_until: None,
                })
                .await?;
            let token = engine.issue_access_token(&profile.id).await?;

            println!("created profile: {} ({})", profile.email, profile.id);
            println!("access token: {token}");
        }
        Command::Profile(Profile {
            command: ProfileCommand::Role(args),
        }) => {
            let role = match parse_role(&args.role) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let profile = engine.set_role(&operator, &args.id, role).await?;
            println!("{} is now {}", profile.email, profile.role.as_str());
        }
        Command::Profile(Profile {
            command: ProfileCommand::Membership(args),
        }) => {
            let until = match parse_until(args.until.as_deref()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let profile = engine.set_active_until(&operator, &args.id, until).await?;
            match profile.active_until {
                Some(until) => println!("{} is a member until {until}", profile.email),
                None => println!("{} has no membership", profile.email),
            }
        }
        Command::Profile(Profile {
            command: ProfileCommand::List,
        }) => {
            for profile in engine.list_profiles(&operator).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    profile.id,
                    profile.role.as_str(),
                    profile.email,
                    profile.name
                );
            }
        }
        Command::Token(Token {
            command: TokenCommand::Issue(args),
        }) => {
            let token = engine.issue_access_token(&args.id).await?;
            println!("access token: {token}");
        }
        Command::Token(Token {
            command: TokenCommand::Revoke(args),
        }) => {
            let revoked = engine.revoke_access_tokens(&args.id).await?;
            println!("revoked {revoked} token(s)");
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Balance(args),
        }) => {
            let balance = engine.balance(&operator, &args.id).await?;
            println!("{}: {} (ledger sum {})", args.id, balance.display, balance.raw);
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Payment(args),
        }) => {
            let entry = engine
                .record_payment(&operator, &args.id, args.amount)
                .await?;
            println!("recorded entry #{}: {}", entry.id, entry.description);
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Adjust(args),
        }) => {
            let entry = engine
                .adjust_balance_to(&operator, &args.id, args.target, &args.reason)
                .await?;
            println!("recorded entry #{}: {}", entry.id, entry.description);
        }
    }

    Ok(())
}
