//! HTTP host for the content generation orchestrator.
//!
//! The binary wires configuration, the model client and the project store
//! together; everything it serves lives here so tests can build the router
//! in-process.

pub mod api;
pub mod metrics;
pub mod state;
