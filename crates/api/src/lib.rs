//! HTTP shell for the segcull annotation service.
//!
//! Thin axum layer over the core state model: handlers look sessions up in
//! shared state, call into `segcull-core`, and talk to the filesystem
//! store and the external label resolver.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
