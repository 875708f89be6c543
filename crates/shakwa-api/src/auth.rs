use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};

/// Shared holder for the signed-in user's bearer credential.
///
/// Cheaply cloneable; every clone observes the same credential. The REST
/// client reads it per request and the push connection reads it on every
/// connect attempt, so a credential swapped in after sign-in (or cleared on
/// sign-out) is picked up without rebuilding either.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<ArcSwapOption<SecretString>>,
}

impl Session {
    /// A session with no credential. The push connection stays idle.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding the given bearer credential.
    pub fn with_token(token: SecretString) -> Self {
        let session = Self::default();
        session.set_token(token);
        session
    }

    /// Replace the held credential.
    pub fn set_token(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
    }

    /// Forget the held credential.
    pub fn clear(&self) {
        self.token.store(None);
    }

    /// The current credential, if any. Empty strings count as absent.
    pub fn token(&self) -> Option<Arc<SecretString>> {
        self.token
            .load_full()
            .filter(|t| !t.expose_secret().trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
