//! Application layer errors

use thiserror::Error;

/// Per-invocation session errors.
///
/// Every variant is an expected, recoverable condition; each one maps to
/// exactly one ephemeral reply at the command boundary and nothing here
/// escapes to a process-level handler. The display strings double as the
/// user-facing reply text.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("You must be in a voice channel.")]
    NoChannel,

    #[error("I'm not connected to a voice channel.")]
    NotConnected,

    #[error("Nothing is playing.")]
    NothingPlaying,

    #[error("Nothing is paused.")]
    NothingPaused,

    #[error("No audio source is active.")]
    NoActiveSource,

    #[error("The current source does not support volume control.")]
    UnsupportedSource,

    #[error("The stream is not configured. Set STREAM_URL or stream.url in config.yaml.")]
    StreamNotConfigured,

    #[error("Failed to play the stream: {0}")]
    Playback(String),

    #[error("Voice connection failed: {0}")]
    Gateway(String),
}

/// Errors crossing the voice backend boundary.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("failed to join voice channel: {0}")]
    Join(String),

    #[error("failed to open audio stream: {0}")]
    Stream(String),

    #[error("playback control failed: {0}")]
    Control(String),

    #[error("failed to disconnect: {0}")]
    Disconnect(String),
}

impl From<VoiceError> for SessionError {
    fn from(error: VoiceError) -> Self {
        match error {
            VoiceError::Join(cause) | VoiceError::Disconnect(cause) => SessionError::Gateway(cause),
            VoiceError::Stream(cause) | VoiceError::Control(cause) => SessionError::Playback(cause),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
