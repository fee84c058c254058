//! # scrawl-api
//!
//! Service and configuration layer for the scrawl HTTP server.
//!
//! The binary in `main.rs` owns the router, handlers, and middleware;
//! this library exposes the pieces integration tests exercise directly.

pub mod config;
pub mod services;
