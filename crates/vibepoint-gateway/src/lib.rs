//! Analysis backend REST client.
//!
//! This crate provides:
//! - Upload ticket, analysis and suggestion calls ([`AnalysisBackend`])
//! - Read-only catalog lookups ([`VideoCatalog`])
//! - Error body decoding with a distinguished not-ready error
//! - Request tracing and metrics

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;


pub use client::{AnalysisBackend, GatewayClient, HealthStatus, VideoCatalog};
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult, PLACEMENT_NOT_FOUND};
