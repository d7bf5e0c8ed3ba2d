//! Bearer-token verification for identity-scoped endpoints.
//!
//! Tokens are JWTs signed with the configured secret; the `sub` claim carries the
//! learner's email.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthSettings;
use crate::error::AuthError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier if a secret is configured.
    pub fn from_settings(settings: &AuthSettings) -> Option<Self> {
        let secret = settings.secret_key.as_ref()?;
        Some(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(settings.algorithm),
        })
    }

    /// Validate the token and return the email it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.sub)
    }
}

fn extract_bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Email of the authenticated caller.
pub struct AuthenticatedEmail(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedEmail {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let verifier = state.verifier.as_ref().ok_or(AuthError::Disabled)?;
        let token = extract_bearer(parts).ok_or(AuthError::Missing)?;
        match verifier.verify(token) {
            Ok(email) => Ok(AuthenticatedEmail(email)),
            Err(e) => {
                debug!(target: "learnbuddy", error = %e, "Bearer token rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    pub const SECRET: &str = "test-secret";

    pub fn token_for(email: &str, secret: &str, exp: u64) -> String {
        let claims = Claims { sub: email.into(), exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    pub fn far_future() -> u64 {
        jsonwebtoken::get_current_timestamp() + 3600
    }

    pub fn verifier() -> TokenVerifier {
        let settings = AuthSettings { secret_key: Some(SECRET.into()), algorithm: Algorithm::HS256 };
        TokenVerifier::from_settings(&settings).unwrap()
    }

    #[test]
    fn accepts_valid_token() {
        let token = token_for("rafi@example.com", SECRET, far_future());
        assert_eq!(verifier().verify(&token).unwrap(), "rafi@example.com");
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = token_for("rafi@example.com", "other", far_future());
        assert!(matches!(verifier().verify(&token), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let token = token_for("rafi@example.com", SECRET, 1_000);
        assert!(matches!(verifier().verify(&token), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn no_secret_means_no_verifier() {
        let settings = AuthSettings { secret_key: None, algorithm: Algorithm::HS256 };
        assert!(TokenVerifier::from_settings(&settings).is_none());
    }
}
