//! Domain layer - Core session logic with no platform dependencies
//!
//! This layer contains:
//! - Entities: Core session objects (GuildSession, VoiceCommand, Reply)
//! - Traits: Abstractions for the voice backend (VoiceGateway, VoiceConnection)

pub mod entities;
pub mod traits;
