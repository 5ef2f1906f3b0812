//! Resolution of bearer credentials to user ids.

use std::sync::Arc;

use async_trait::async_trait;
use engine::{Engine, EngineError};

/// Maps the opaque credential a client presents to the id of the profile it
/// belongs to. `None` means the credential is unknown.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_id(&self, credential: &str) -> Result<Option<String>, EngineError>;
}

/// Looks credentials up in the engine's access-token table.
#[derive(Clone, Debug)]
pub struct TokenIdentity {
    engine: Arc<Engine>,
}

impl TokenIdentity {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentity {
    async fn user_id(&self, credential: &str) -> Result<Option<String>, EngineError> {
        self.engine.resolve_access_token(credential).await
    }
}
