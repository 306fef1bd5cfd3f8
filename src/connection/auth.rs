use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

/// Fallback shown when the signed-in user has no usable name.
pub const ANONYMOUS_NAME: &str = "User";

/// Read-only view of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_string());
        Self {
            first_name: non_empty(first_name),
            last_name: non_empty(last_name),
            email: non_empty(email),
        }
    }

    /// "First Last" when a first name is known, otherwise the email,
    /// otherwise "User".
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.email) {
            (Some(first), _) => match &self.last_name {
                Some(last) => format!("{} {}", first, last),
                None => first.clone(),
            },
            (None, Some(email)) => email.clone(),
            (None, None) => ANONYMOUS_NAME.to_string(),
        }
    }

    /// Name used in greetings: the first name alone
    pub fn greeting_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(ANONYMOUS_NAME)
    }

    /// One-letter avatar
    pub fn initial(&self) -> char {
        self.first_name
            .as_deref()
            .or(self.email.as_deref())
            .and_then(|s| s.chars().next())
            .unwrap_or('U')
    }
}

/// Identity provider
///
/// Credentials and sessions are managed entirely on the provider's side;
/// callers only read who is signed in and can ask to sign out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Option<Identity>;

    async fn logout(&self);
}

/// In-process provider holding a fixed identity until logout
pub struct StaticAuthProvider {
    user: RwLock<Option<Identity>>,
}

impl StaticAuthProvider {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            user: RwLock::new(Some(identity)),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: RwLock::new(None),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Option<Identity> {
        self.user.read().await.clone()
    }

    async fn logout(&self) {
        let mut user = self.user.write().await;
        if let Some(identity) = user.take() {
            info!(user = %identity.display_name(), "signed out");
        }
    }
}
