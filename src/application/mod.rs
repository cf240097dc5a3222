//! Application layer - Session orchestration
//!
//! This layer contains:
//! - Services: The voice session controller
//! - Errors: Per-command and backend error taxonomies

pub mod errors;
pub mod services;
