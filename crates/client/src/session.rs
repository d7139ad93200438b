//! Per-client session state
//!
//! Holds the identity of the signed-in user once the session has been
//! validated. Controllers receive a [`Session`] handle at construction and
//! wait on it instead of polling for the identity to show up.

use crate::types::UserId;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Shared handle to the current user's identity
#[derive(Debug, Clone)]
pub struct Session {
    identity: Arc<watch::Sender<Option<UserId>>>,
}

impl Session {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity: Arc::new(identity),
        }
    }

    /// The current identity, if the session has been validated
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.borrow().clone()
    }

    /// Record the identity and wake everything waiting for it
    pub fn set_user_id(&self, user_id: UserId) {
        debug!(%user_id, "Session identity known");
        self.identity.send_replace(Some(user_id));
    }

    pub fn clear(&self) {
        self.identity.send_replace(None);
    }

    /// Resolve once the identity is known
    ///
    /// Returns immediately when it already is. `None` is only possible if the
    /// channel closed, which cannot happen while `self` is alive.
    pub async fn wait_for_identity(&self) -> Option<UserId> {
        let mut rx = self.identity.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|identity| identity.clone())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn waiters_resolve_when_identity_arrives() {
        let session = Session::new();
        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.wait_for_identity().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        session.set_user_id(UserId::from(42));
        let resolved = waiter.await.unwrap();
        assert_eq!(resolved, Some(UserId::from(42)));
    }

    #[tokio::test]
    async fn known_identity_resolves_immediately() {
        let session = Session::new();
        session.set_user_id(UserId::from("7"));
        assert_eq!(session.wait_for_identity().await, Some(UserId::from(7)));
    }
}
