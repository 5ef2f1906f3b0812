use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{EngineError, LogNotifier, MoneyCents, Notifier, ResultEngine};

mod access;
mod announcements;
mod balances;
mod bookings;
mod inquiries;
mod profiles;

/// Guest fee charged when none is configured: 20.00.
pub const DEFAULT_GUEST_FEE: MoneyCents = MoneyCents::new(20_00);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    guest_fee: MoneyCents,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("guest_fee", &self.guest_fee)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The configured default guest fee.
    pub fn guest_fee(&self) -> MoneyCents {
        self.guest_fee
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = normalize_required_text(value, "email")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::Validation(format!("invalid email: {email}"))),
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn Notifier>>,
    guest_fee: Option<MoneyCents>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where booking confirmations and inquiry notices go. Defaults to
    /// [`LogNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Default amount of a guest fee.
    pub fn guest_fee(mut self, amount: MoneyCents) -> EngineBuilder {
        self.guest_fee = Some(amount);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let guest_fee = self.guest_fee.unwrap_or(DEFAULT_GUEST_FEE);
        if !guest_fee.is_positive() {
            return Err(EngineError::Validation(
                "guest fee must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            guest_fee,
        })
    }
}
