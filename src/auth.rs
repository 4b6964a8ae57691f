//! Bearer-token verification for the admin API.
//!
//! [`TokenVerifier`] is the seam to an identity provider. The shipped
//! [`StaticTokenVerifier`] checks tokens listed in `[[auth.users]]`.

use anyhow::Result;
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
}

/// Maps a bearer token to an identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Returns the identity owning `token`, or `None` if it is not valid.
    async fn verify(&self, token: &str) -> Option<Identity>;
}

/// Fixed set of `(uid, token)` pairs.
pub struct StaticTokenVerifier {
    users: Vec<(String, String)>,
}

impl StaticTokenVerifier {
    pub fn new(users: Vec<(String, String)>) -> Self {
        Self { users }
    }

    /// Build from `[auth]`, resolving `token_env` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if a user's token cannot be resolved.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let users = auth
            .users
            .iter()
            .map(|user| Ok((user.uid.clone(), user.resolve_token()?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<Identity> {
        // Compare against every entry so timing doesn't reveal which one matched
        let mut found = None;
        for (uid, expected) in &self.users {
            if bool::from(expected.as_bytes().ct_eq(token.as_bytes())) && found.is_none() {
                found = Some(uid);
            }
        }
        found.map(|uid| Identity { uid: uid.clone() })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn verifier() -> StaticTokenVerifier {
        StaticTokenVerifier::new(vec![
            ("owner".into(), "owner-token".into()),
            ("editor".into(), "editor-token".into()),
        ])
    }

    #[tokio::test]
    async fn test_verify_known_tokens() {
        let v = verifier();
        assert_eq!(v.verify("owner-token").await.unwrap().uid, "owner");
        assert_eq!(v.verify("editor-token").await.unwrap().uid, "editor");
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_and_prefix() {
        let v = verifier();
        assert!(v.verify("").await.is_none());
        assert!(v.verify("owner").await.is_none());
        assert!(v.verify("owner-token-extra").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_verifier_rejects_everything() {
        let v = StaticTokenVerifier::new(Vec::new());
        assert!(v.is_empty());
        assert!(v.verify("anything").await.is_none());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  abc "));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_from_config() {
        let auth = AuthConfig {
            users: vec![crate::config::AuthUser {
                uid: "owner".into(),
                token: Some("t".into()),
                token_env: None,
            }],
        };
        assert_eq!(StaticTokenVerifier::from_config(&auth).unwrap().len(), 1);
    }
}
