//! # ri-auth-simple
//!
//! Salted-signature implementation of `AuthProvider`.
//!
//! Tokens are `<uuid>.<signature>` where the signature is a truncated
//! SHA-256 over the salt and the user ID. Good enough for the identity
//! boundary this service needs; a real identity provider slots in behind
//! the same trait.

use async_trait::async_trait;
use ri_core::traits::AuthProvider;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub struct SimpleAuthProvider {
    /// Secret salt for token signatures (e.g., from an environment variable).
    session_salt: String,
}

impl SimpleAuthProvider {
    pub fn new(salt: &str) -> Self {
        Self {
            session_salt: salt.to_string(),
        }
    }

    fn signature(&self, user_id: &Uuid) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_salt.as_bytes());
        hasher.update(user_id.as_bytes());
        let hash = hex::encode(hasher.finalize());
        // Truncated for token brevity
        hash[..16].to_string()
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    fn issue_token(&self, user_id: Uuid) -> String {
        format!("{}.{}", user_id, self.signature(&user_id))
    }

    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let Some((id_part, sig)) = token.split_once('.') else {
            return Ok(None);
        };
        let Ok(user_id) = Uuid::parse_str(id_part) else {
            return Ok(None);
        };
        if sig == self.signature(&user_id) {
            Ok(Some(user_id))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_tokens_authenticate() {
        let auth = SimpleAuthProvider::new("test-salt");
        let user_id = Uuid::now_v7();

        let token = auth.issue_token(user_id);
        assert_eq!(auth.authenticate(&token).await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn tampered_tokens_are_rejected() {
        let auth = SimpleAuthProvider::new("test-salt");
        let token = auth.issue_token(Uuid::now_v7());

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('0');
        // One in sixteen chance the flipped character matches; pick the other
        if tampered == token {
            tampered.pop();
            tampered.push('1');
        }
        assert_eq!(auth.authenticate(&tampered).await.unwrap(), None);
    }

    #[tokio::test]
    async fn tokens_are_salt_specific() {
        let a = SimpleAuthProvider::new("salt-a");
        let b = SimpleAuthProvider::new("salt-b");
        let token = a.issue_token(Uuid::now_v7());
        assert_eq!(b.authenticate(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let auth = SimpleAuthProvider::new("test-salt");
        assert_eq!(auth.authenticate("not-a-token").await.unwrap(), None);
        assert_eq!(auth.authenticate("nope.nope").await.unwrap(), None);
    }
}
