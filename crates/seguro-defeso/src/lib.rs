//! Document intake, eligibility scoring and case tracking for Seguro-Defeso claims.

pub mod config;
pub mod error;
pub mod notifications;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod workflows;
