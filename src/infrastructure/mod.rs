//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Platform integrations (Discord gateway, voice backend)

pub mod adapters;
pub mod config;
