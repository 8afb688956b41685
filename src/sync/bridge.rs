use std::sync::Arc;

use crate::Result;
use crate::core::identity::UserIdentity;
use crate::core::todo::TodoItem;
use crate::sync::document::DocumentStore;
use crate::sync::identity::IdentityProvider;
use crate::sync::session::SessionCache;

/// Ties sign-in, the session cache and the per-user document together.
pub struct PersistenceBridge {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    session: SessionCache,
}

impl PersistenceBridge {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        session: SessionCache,
    ) -> Self {
        Self {
            provider,
            store,
            session,
        }
    }

    /// Identity left over from a previous run, without contacting the provider.
    pub fn restore_session(&self) -> Option<UserIdentity> {
        let identity = self.session.load()?;
        log::info!("Restored session for {}", identity.display_name());
        Some(identity)
    }

    /// Sign in, preferring the cached session over a provider round-trip.
    pub async fn sign_in(&self) -> Result<UserIdentity> {
        if let Some(identity) = self.restore_session() {
            return Ok(identity);
        }
        let identity = self.provider.sign_in().await?;
        if let Err(e) = self.session.save(&identity) {
            log::warn!("Failed to cache session: {}", e);
        }
        Ok(identity)
    }

    pub async fn load_todos(&self, uid: &str) -> Result<Option<Vec<TodoItem>>> {
        let todos = self.store.load_todos(uid).await?;
        match &todos {
            Some(t) => log::info!("Loaded {} stored todos", t.len()),
            None => log::info!("No stored todos for this user"),
        }
        Ok(todos)
    }

    pub async fn save_todos(&self, uid: &str, todos: &[TodoItem]) -> Result<()> {
        self.store.save_todos(uid, todos).await?;
        log::debug!("Mirrored {} todos", todos.len());
        Ok(())
    }

    /// Forget the cached session so the next sign-in goes to the provider.
    pub fn clear_session(&self) {
        if let Err(e) = self.session.clear() {
            log::error!("Failed to clear session cache: {}", e);
        }
    }

    /// End the provider session. Failures are only logged.
    pub async fn end_provider_session(&self) {
        if let Err(e) = self.provider.sign_out().await {
            log::error!("Sign-out failed: {}", e);
        }
    }
}
