//! Google Identity Toolkit verifier.
//!
//! Verifies provider-issued ID tokens by submitting them to the
//! `accounts:lookup` REST endpoint. The provider distinguishes expired
//! tokens from structurally invalid ones; every other failure collapses
//! to a generic rejection whose cause is logged but never surfaced.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use scrawl_core::{Error, Identity, Result, TokenVerifier};

use crate::MISSING_AUTH_MSG;

/// Default Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// Timeout for verification requests (seconds).
pub const VERIFY_TIMEOUT_SECS: u64 = 10;

/// Verifier backed by the Google Identity Toolkit REST API.
pub struct GoogleIdentityVerifier {
    client: Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl GoogleIdentityVerifier {
    /// Create a verifier for the public Google endpoint.
    pub fn new(project_id: String, api_key: String) -> Self {
        Self::with_base_url(DEFAULT_IDENTITY_TOOLKIT_URL.to_string(), project_id, api_key)
    }

    /// Create a verifier with a custom endpoint (used by tests).
    pub fn with_base_url(base_url: String, project_id: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            project_id,
            api_key,
        }
    }

    /// The project this verifier is bound to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    users: Option<Vec<UserRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Deserialize)]
struct LookupError {
    error: LookupErrorBody,
}

#[derive(Deserialize)]
struct LookupErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a provider error code onto a rejection.
///
/// Codes may carry a trailing explanation ("TOKEN_EXPIRED : ..."), so
/// matching is on the prefix.
fn rejection_for(code: &str) -> Error {
    if code.starts_with("TOKEN_EXPIRED") {
        Error::Unauthorized("Authentication token has expired".to_string())
    } else if code.starts_with("INVALID_ID_TOKEN") || code.starts_with("USER_NOT_FOUND") {
        Error::Unauthorized("Invalid authentication token".to_string())
    } else {
        Error::Unauthorized("Could not validate credentials".to_string())
    }
}

#[async_trait]
impl TokenVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: Option<&str>) -> Result<Identity> {
        let token = credential.ok_or_else(|| Error::Unauthorized(MISSING_AUTH_MSG.to_string()))?;

        let response = self
            .client
            .post(format!(
                "{}/v1/accounts:lookup?key={}",
                self.base_url, self.api_key
            ))
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider request failed");
                Error::Unauthorized("Could not validate credentials".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<LookupError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_default();
            debug!(%status, code = %code, "Identity provider rejected token");
            return Err(rejection_for(&code));
        }

        let result: LookupResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse identity provider response");
            Error::Unauthorized("Could not validate credentials".to_string())
        })?;

        let user = result
            .users
            .and_then(|mut users| {
                if users.is_empty() {
                    None
                } else {
                    Some(users.remove(0))
                }
            })
            .ok_or_else(|| Error::Unauthorized("Invalid authentication token".to_string()))?;

        debug!(
            user_id = %user.local_id,
            project_id = %self.project_id,
            "Token verified"
        );

        Ok(Identity {
            user_id: user.local_id,
            email: user.email,
            email_verified: user.email_verified,
            name: user.display_name,
            picture: user.photo_url,
        })
    }
}
