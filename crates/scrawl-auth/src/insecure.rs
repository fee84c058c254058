//! Explicit development-mode verifier.
//!
//! Selected only by the insecure-mode startup flag. Every presented
//! credential resolves to one fixed synthetic identity so the service can
//! run without a configured identity provider. Never wire this into a
//! deployment that faces real users.

use async_trait::async_trait;
use tracing::debug;

use scrawl_core::{Error, Identity, Result, TokenVerifier};

use crate::MISSING_AUTH_MSG;

/// Token literal recognized by development tooling.
pub const DEV_BYPASS_TOKEN: &str = "dev-token-123";

/// Stable id of the synthetic development user.
pub const DEV_USER_ID: &str = "dev-user-123";

/// Verifier that accepts any credential and resolves it to the synthetic
/// development identity. A missing credential still rejects.
#[derive(Debug, Clone, Default)]
pub struct InsecureVerifier;

impl InsecureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// The fixed identity every credential resolves to.
    pub fn dev_identity() -> Identity {
        Identity {
            user_id: DEV_USER_ID.to_string(),
            email: Some("dev@example.com".to_string()),
            email_verified: true,
            name: Some("Development User".to_string()),
            picture: None,
        }
    }
}

#[async_trait]
impl TokenVerifier for InsecureVerifier {
    async fn verify(&self, credential: Option<&str>) -> Result<Identity> {
        let token = credential.ok_or_else(|| Error::Unauthorized(MISSING_AUTH_MSG.to_string()))?;

        if token == DEV_BYPASS_TOKEN {
            debug!("Development bypass token presented");
        }
        Ok(Self::dev_identity())
    }
}
