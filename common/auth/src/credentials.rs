use std::fmt;

use async_trait::async_trait;

pub const DEFAULT_USERNAME: &str = "testuser";
pub const DEFAULT_PASSWORD: &str = "password";

/// Decides whether a username/password pair may receive a token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn validate(&self, username: &str, password: &str) -> bool;
}

/// A single fixed credential pair compared in plaintext.
///
/// INSECURE PLACEHOLDER: there is no password hashing and no throttling of
/// failed attempts. Swap in a real [`CredentialStore`] before exposing the
/// service to anything but local development.
#[derive(Clone)]
pub struct StaticCredentialStore {
    username: String,
    password: String,
}

impl StaticCredentialStore {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for StaticCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for StaticCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialStore")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn validate(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_only_the_configured_pair() {
        let store = StaticCredentialStore::default();
        assert!(store.validate("testuser", "password").await);

        for (user, pass) in [
            ("testuser", "Password"),
            ("TestUser", "password"),
            ("testuser", ""),
            ("", "password"),
            ("", ""),
            ("admin", "admin"),
            ("testuser ", "password"),
        ] {
            assert!(!store.validate(user, pass).await, "{user}/{pass}");
        }
    }

    #[test]
    fn debug_output_hides_password() {
        let store = StaticCredentialStore::new("alice", "hunter2");
        let rendered = format!("{store:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
