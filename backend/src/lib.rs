//! Cross-store orchestration backend for fitness tracking.
//!
//! Coordinators in [`domain::orchestration`] apply one business operation as
//! a saga spanning the relational store and the document store, with the
//! achievement engine enlisted in the relational transaction.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::OrchestrationSettings;
