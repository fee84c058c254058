//! Environment-sourced server configuration.
//!
//! All dependencies are resolved here once, at startup; nothing downstream
//! inspects the environment or falls back based on a missing connection.

use scrawl_auth::DEFAULT_IDENTITY_TOOLKIT_URL;
use scrawl_core::{Error, Result};
use scrawl_db::StorageBackend;

/// Default CORS origins for local frontends.
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,http://localhost:8080,http://localhost:5173";

/// Identity verification mode, fixed at startup.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Verify tokens against the Google Identity Toolkit.
    Google {
        project_id: String,
        api_key: String,
        endpoint: String,
    },
    /// Explicit development mode: every token resolves to the synthetic
    /// development user. Requires `AUTH_INSECURE=true`.
    Insecure,
}

/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub auth: AuthMode,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails when the Postgres backend is selected without `DATABASE_URL`,
    /// or when no identity provider is configured and `AUTH_INSECURE` is
    /// unset — the insecure mode is never entered silently.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => {
                let url = std::env::var("DATABASE_URL").map_err(|_| {
                    Error::Config(
                        "STORAGE_BACKEND=postgres requires DATABASE_URL \
                         (set STORAGE_BACKEND=memory for the in-memory fallback)"
                            .to_string(),
                    )
                })?;
                StorageBackend::Postgres { url }
            }
            other => {
                return Err(Error::Config(format!(
                    "Unknown STORAGE_BACKEND '{}' (expected 'postgres' or 'memory')",
                    other
                )))
            }
        };

        let insecure = std::env::var("AUTH_INSECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let auth = if insecure {
            AuthMode::Insecure
        } else {
            let project_id = std::env::var("GOOGLE_PROJECT_ID")
                .ok()
                .filter(|v| !v.is_empty());
            let api_key = std::env::var("GOOGLE_WEB_API_KEY")
                .ok()
                .filter(|v| !v.is_empty());
            match (project_id, api_key) {
                (Some(project_id), Some(api_key)) => AuthMode::Google {
                    project_id,
                    api_key,
                    endpoint: std::env::var("IDENTITY_TOOLKIT_URL")
                        .unwrap_or_else(|_| DEFAULT_IDENTITY_TOOLKIT_URL.to_string()),
                },
                _ => {
                    return Err(Error::Config(
                        "No identity provider configured: set GOOGLE_PROJECT_ID and \
                         GOOGLE_WEB_API_KEY, or AUTH_INSECURE=true for development"
                            .to_string(),
                    ))
                }
            }
        };

        let allowed_origins = parse_origins(
            &std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        Ok(Self {
            host,
            port,
            storage,
            auth,
            allowed_origins,
        })
    }
}

/// Split a comma-separated origin list, dropping empty entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:3000, http://localhost:8080 ,");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "http://localhost:8080"]
        );
    }

    #[test]
    fn test_parse_origins_empty_input() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ,").is_empty());
    }
}
