use std::time::Duration;

use async_trait::async_trait;

use crate::application::errors::VoiceError;
use crate::domain::entities::{ChannelId, GuildId, PlaybackSource};

/// Options handed to the audio source factory when opening a stream.
///
/// These map onto the ffmpeg flags the stream is opened with; the
/// defaults match what a flaky internet radio feed needs to survive
/// short transport drops.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub reconnect: bool,
    pub reconnect_streamed: bool,
    pub max_reconnect_delay: Duration,
    /// Suppress the banner and keep the log level at warnings.
    pub quiet: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_streamed: true,
            max_reconnect_delay: Duration::from_secs(5),
            quiet: true,
        }
    }
}

/// A request to start playback over an established connection.
#[derive(Debug, Clone, Copy)]
pub struct StreamRequest<'a> {
    pub url: &'a str,
    pub options: &'a StreamOptions,
    /// Initial gain, already clamped by the session.
    pub volume: f32,
}

/// Establishes voice connections on behalf of the session controller.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connect(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Box<dyn VoiceConnection>, VoiceError>;
}

/// An established voice connection, treated as an opaque capability.
///
/// The controller only issues the calls below; protocol framing, codecs
/// and mixing all live behind this trait.
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    fn channel(&self) -> ChannelId;

    async fn move_to(&mut self, channel: ChannelId) -> Result<(), VoiceError>;

    async fn disconnect(&mut self) -> Result<(), VoiceError>;

    /// Opens the stream and begins playback, replacing any current track.
    async fn play(&mut self, request: StreamRequest<'_>) -> Result<PlaybackSource, VoiceError>;

    fn stop(&mut self);

    fn pause(&mut self) -> Result<(), VoiceError>;

    fn resume(&mut self) -> Result<(), VoiceError>;

    fn is_playing(&self) -> bool;

    fn is_paused(&self) -> bool;
}

/// Live volume control over an active source.
pub trait VolumeControl: Send + Sync {
    fn set_volume(&self, volume: f32) -> Result<(), VoiceError>;
}
