//! HTTP server for the club league engine.
//!
//! Exposes the engine's hierarchy, enrollment, scheduling, match and
//! standings operations as a JSON API built on axum.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
