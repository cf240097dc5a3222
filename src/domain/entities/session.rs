use super::ids::GuildId;
use crate::domain::traits::voice::{VoiceConnection, VolumeControl};

/// Playback volume applied when nothing else is configured.
pub const DEFAULT_VOLUME: f32 = 0.6;

/// Lowest accepted volume (silence).
pub const MIN_VOLUME: f32 = 0.0;

/// Highest accepted volume (2x amplification).
pub const MAX_VOLUME: f32 = 2.0;

/// Clamp a requested volume into the supported range.
///
/// Total over all inputs: out-of-range values are pulled to the nearest
/// bound and non-finite values fall to silence rather than propagating.
pub fn clamp_volume(value: f32) -> f32 {
    if !value.is_finite() {
        return MIN_VOLUME;
    }
    value.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// The audio source currently bound to a voice connection.
pub enum PlaybackSource {
    /// Gain can be adjusted in place while the stream keeps playing.
    VolumeAdjustable(Box<dyn VolumeControl>),
    /// A source that cannot be adjusted after it has started.
    Opaque,
}

/// Connection/playback state as seen by the command state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Idle,
    Playing,
    Paused,
}

/// Events pushed by the voice backend outside of any command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The active source ran out or errored out on its own.
    PlaybackFinished(GuildId),
    /// The voice driver dropped the connection.
    Disconnected(GuildId),
}

/// Per-guild voice session.
///
/// Created lazily on the first command for a guild and kept for the
/// process lifetime; re-joining reuses the same session (and its volume).
pub struct GuildSession {
    pub guild_id: GuildId,
    pub connection: Option<Box<dyn VoiceConnection>>,
    pub source: Option<PlaybackSource>,
    volume: f32,
}

impl GuildSession {
    pub fn new(guild_id: GuildId, volume: f32) -> Self {
        Self {
            guild_id,
            connection: None,
            source: None,
            volume: clamp_volume(volume),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Stores the clamped volume and returns what was actually stored.
    pub fn set_volume(&mut self, value: f32) -> f32 {
        self.volume = clamp_volume(value);
        self.volume
    }

    pub fn state(&self) -> SessionState {
        match self.connection.as_ref() {
            None => SessionState::Disconnected,
            Some(conn) if conn.is_playing() => SessionState::Playing,
            Some(conn) if conn.is_paused() => SessionState::Paused,
            Some(_) => SessionState::Idle,
        }
    }

    /// True while the session respects "no source without a connection".
    pub fn is_consistent(&self) -> bool {
        self.connection.is_some() || self.source.is_none()
    }
}
