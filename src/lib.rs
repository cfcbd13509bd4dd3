//! Request-time bearer-token authorization gate.
//!
//! The core lives in [`services::auth`]: credential extraction, token
//! verification against an atomically swappable trust anchor, and the
//! allow/deny decision. The remaining modules host it behind axum.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
