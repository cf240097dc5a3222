//! Domain traits - Abstractions for the voice backend implementation

pub mod voice;

pub use voice::{StreamOptions, StreamRequest, VoiceConnection, VoiceGateway, VolumeControl};
