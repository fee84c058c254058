//! # scrawl-auth
//!
//! Identity verification for scrawl.
//!
//! Two [`scrawl_core::TokenVerifier`] implementations, chosen once at
//! startup by configuration:
//!
//! - [`GoogleIdentityVerifier`] submits bearer credentials to the Google
//!   Identity Toolkit REST endpoint for verification.
//! - [`InsecureVerifier`] resolves every presented credential to a fixed
//!   synthetic development identity. It is only ever selected by an
//!   explicit insecure-mode flag.

pub mod google;
pub mod insecure;

pub use google::{GoogleIdentityVerifier, DEFAULT_IDENTITY_TOOLKIT_URL};
pub use insecure::{InsecureVerifier, DEV_BYPASS_TOKEN, DEV_USER_ID};

/// Rejection reason for requests without an `Authorization` header.
pub const MISSING_AUTH_MSG: &str = "Authorization header is missing";
