//! Songbird-backed voice connections.
//!
//! Everything protocol-shaped lives here: joining voice channels through
//! the shared songbird manager, opening the stream with ffmpeg, and
//! mirroring driver events back into session events.

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use songbird::events::{Event, EventContext, EventHandler as SongbirdEventHandler};
use songbird::id::{ChannelId as SbChannelId, GuildId as SbGuildId};
use songbird::tracks::TrackHandle;
use songbird::{input, Call, CoreEvent, Songbird, TrackEvent};
use tokio::sync::{mpsc, Mutex};

use crate::application::errors::VoiceError;
use crate::domain::entities::{ChannelId, GuildId, PlaybackSource, SessionEvent};
use crate::domain::traits::voice::{
    StreamOptions, StreamRequest, VoiceConnection, VoiceGateway, VolumeControl,
};

/// 48kHz stereo float PCM, the format the mixer expects on stdin.
const FFMPEG_OUTPUT_ARGS: &[&str] = &[
    "-f",
    "s16le",
    "-ac",
    "2",
    "-ar",
    "48000",
    "-acodec",
    "pcm_f32le",
    "-",
];

fn pre_input_args(options: &StreamOptions) -> Vec<String> {
    let mut args = Vec::new();
    if options.quiet {
        args.extend(["-hide_banner", "-loglevel", "warning"].map(String::from));
    }
    if options.reconnect {
        args.extend(["-reconnect", "1"].map(String::from));
    }
    if options.reconnect_streamed {
        args.extend(["-reconnect_streamed", "1"].map(String::from));
    }
    args.push("-reconnect_delay_max".to_string());
    args.push(options.max_reconnect_delay.as_secs().to_string());
    args
}

/// Playback state as the driver last reported it.
///
/// Kept in a plain mutex so the connection can answer is_playing /
/// is_paused without awaiting; the track-end watcher writes to it from
/// the driver thread.
#[derive(Clone, Copy, PartialEq)]
enum PlayState {
    Idle,
    Playing,
    Paused,
}

pub struct SongbirdGateway {
    manager: Arc<Songbird>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { manager, events }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn connect(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Box<dyn VoiceConnection>, VoiceError> {
        let (call, result) = self
            .manager
            .join(SbGuildId(guild.0), SbChannelId(channel.0))
            .await;
        result.map_err(|e| VoiceError::Join(format!("{:?}", e)))?;

        {
            let mut handle = call.lock().await;
            handle.add_global_event(
                Event::Core(CoreEvent::DriverDisconnect),
                DisconnectWatcher {
                    guild,
                    events: self.events.clone(),
                },
            );
        }

        tracing::info!("Joined voice channel {} in guild {}", channel, guild);
        Ok(Box::new(SongbirdConnection {
            guild,
            channel,
            manager: self.manager.clone(),
            call,
            track: None,
            state: Arc::new(StdMutex::new(PlayState::Idle)),
            events: self.events.clone(),
        }))
    }
}

struct SongbirdConnection {
    guild: GuildId,
    channel: ChannelId,
    manager: Arc<Songbird>,
    call: Arc<Mutex<Call>>,
    track: Option<TrackHandle>,
    state: Arc<StdMutex<PlayState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    async fn move_to(&mut self, channel: ChannelId) -> Result<(), VoiceError> {
        let (_, result) = self
            .manager
            .join(SbGuildId(self.guild.0), SbChannelId(channel.0))
            .await;
        result.map_err(|e| VoiceError::Join(format!("{:?}", e)))?;
        self.channel = channel;
        tracing::info!("Moved to voice channel {} in guild {}", channel, self.guild);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), VoiceError> {
        if let Some(track) = self.track.take() {
            let _ = track.stop();
        }
        *self.state.lock().unwrap() = PlayState::Idle;
        self.manager
            .remove(SbGuildId(self.guild.0))
            .await
            .map_err(|e| VoiceError::Disconnect(format!("{:?}", e)))?;
        tracing::info!("Left voice in guild {}", self.guild);
        Ok(())
    }

    async fn play(&mut self, request: StreamRequest<'_>) -> Result<PlaybackSource, VoiceError> {
        if let Some(track) = self.track.take() {
            let _ = track.stop();
        }

        let pre_args = pre_input_args(request.options);
        let pre_args: Vec<&str> = pre_args.iter().map(String::as_str).collect();
        let source = input::ffmpeg_optioned(request.url, &pre_args, FFMPEG_OUTPUT_ARGS)
            .await
            .map_err(|e| VoiceError::Stream(format!("{:?}", e)))?;

        let track = {
            let mut call = self.call.lock().await;
            call.play_only_source(source)
        };
        track
            .set_volume(request.volume)
            .map_err(|e| VoiceError::Control(format!("{:?}", e)))?;
        let _ = track.add_event(
            Event::Track(TrackEvent::End),
            TrackEndWatcher {
                guild: self.guild,
                state: self.state.clone(),
                events: self.events.clone(),
            },
        );

        *self.state.lock().unwrap() = PlayState::Playing;
        self.track = Some(track.clone());
        tracing::info!("Streaming {} in guild {}", request.url, self.guild);
        Ok(PlaybackSource::VolumeAdjustable(Box::new(TrackVolume(
            track,
        ))))
    }

    fn stop(&mut self) {
        if let Some(track) = self.track.take() {
            let _ = track.stop();
        }
        *self.state.lock().unwrap() = PlayState::Idle;
    }

    fn pause(&mut self) -> Result<(), VoiceError> {
        let Some(track) = self.track.as_ref() else {
            return Err(VoiceError::Control("no active track".to_string()));
        };
        track
            .pause()
            .map_err(|e| VoiceError::Control(format!("{:?}", e)))?;
        *self.state.lock().unwrap() = PlayState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), VoiceError> {
        let Some(track) = self.track.as_ref() else {
            return Err(VoiceError::Control("no active track".to_string()));
        };
        track
            .play()
            .map_err(|e| VoiceError::Control(format!("{:?}", e)))?;
        *self.state.lock().unwrap() = PlayState::Playing;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        *self.state.lock().unwrap() == PlayState::Playing
    }

    fn is_paused(&self) -> bool {
        *self.state.lock().unwrap() == PlayState::Paused
    }
}

/// Live gain control over the running track.
struct TrackVolume(TrackHandle);

impl VolumeControl for TrackVolume {
    fn set_volume(&self, volume: f32) -> Result<(), VoiceError> {
        self.0
            .set_volume(volume)
            .map_err(|e| VoiceError::Control(format!("{:?}", e)))
    }
}

/// Fires once when the stream ends on its own (or errors out mid-air).
struct TrackEndWatcher {
    guild: GuildId,
    state: Arc<StdMutex<PlayState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

#[async_trait]
impl SongbirdEventHandler for TrackEndWatcher {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        *self.state.lock().unwrap() = PlayState::Idle;
        let _ = self.events.send(SessionEvent::PlaybackFinished(self.guild));
        Some(Event::Cancel)
    }
}

/// Fires when the voice driver loses its connection (kick, channel
/// deletion, region fault).
struct DisconnectWatcher {
    guild: GuildId,
    events: mpsc::UnboundedSender<SessionEvent>,
}

#[async_trait]
impl SongbirdEventHandler for DisconnectWatcher {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let _ = self.events.send(SessionEvent::Disconnected(self.guild));
        None
    }
}
