//! Response models for the node's HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) serialized into
//! JSON response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
