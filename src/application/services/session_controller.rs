//! Voice session controller - validates and executes the slash commands
//! against per-guild sessions.
//!
//! This is the only part of the bot with decision logic: every command
//! checks the (connection, playback) state of its guild session, then
//! forwards a single call into the voice backend. Commands for the same
//! guild serialize on the session lock; different guilds interleave.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::errors::SessionError;
use crate::domain::entities::{
    ChannelId, GuildId, GuildSession, Invocation, PlaybackSource, Reply, SessionEvent, VoiceCommand,
};
use crate::domain::traits::voice::{StreamOptions, StreamRequest, VoiceGateway};

/// Service owning every guild session and the rules of the command
/// state machine.
pub struct SessionController {
    gateway: Arc<dyn VoiceGateway>,
    sessions: Mutex<HashMap<GuildId, Arc<Mutex<GuildSession>>>>,
    stream_url: Option<String>,
    stream_options: StreamOptions,
    default_volume: f32,
}

impl SessionController {
    pub fn new(
        gateway: Arc<dyn VoiceGateway>,
        stream_url: Option<String>,
        default_volume: f32,
    ) -> Self {
        Self {
            gateway,
            sessions: Mutex::new(HashMap::new()),
            stream_url,
            stream_options: StreamOptions::default(),
            default_volume: crate::domain::entities::clamp_volume(default_volume),
        }
    }

    pub fn with_stream_options(mut self, options: StreamOptions) -> Self {
        self.stream_options = options;
        self
    }

    /// Executes one invocation against its guild session.
    ///
    /// Errors never leave this method: every failure becomes an ephemeral
    /// reply naming the condition.
    pub async fn dispatch(&self, guild: GuildId, invocation: Invocation) -> Reply {
        let session = self.session(guild).await;
        let mut session = session.lock().await;

        let command = invocation.command;
        let result = match command {
            VoiceCommand::Join => self.join(&mut session, invocation.user_channel).await,
            VoiceCommand::Leave => self.leave(&mut session).await,
            VoiceCommand::Play => self.play(&mut session, invocation.user_channel).await,
            VoiceCommand::Stop => self.stop(&mut session),
            VoiceCommand::Pause => self.pause(&mut session),
            VoiceCommand::Resume => self.resume(&mut session),
            VoiceCommand::SetVolume(value) => self.set_volume(&mut session, value),
            VoiceCommand::Status => self.status(&session),
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!("Command /{} rejected in guild {}: {}", command.name(), guild, e);
                Reply::ephemeral(e.to_string())
            }
        }
    }

    /// Applies a backend event (track ended, driver dropped) to the
    /// session it belongs to. Unknown guilds are ignored.
    pub async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::PlaybackFinished(guild) => {
                if let Some(session) = self.existing_session(guild).await {
                    let mut session = session.lock().await;
                    if session.source.take().is_some() {
                        tracing::info!("Playback finished in guild {}", guild);
                    }
                }
            }
            SessionEvent::Disconnected(guild) => {
                if let Some(session) = self.existing_session(guild).await {
                    let mut session = session.lock().await;
                    if session.connection.take().is_some() {
                        tracing::info!("Voice connection dropped in guild {}", guild);
                    }
                    session.source = None;
                }
            }
        }
    }

    async fn session(&self, guild: GuildId) -> Arc<Mutex<GuildSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(guild)
            .or_insert_with(|| Arc::new(Mutex::new(GuildSession::new(guild, self.default_volume))))
            .clone()
    }

    async fn existing_session(&self, guild: GuildId) -> Option<Arc<Mutex<GuildSession>>> {
        self.sessions.lock().await.get(&guild).cloned()
    }

    async fn join(
        &self,
        session: &mut GuildSession,
        user_channel: Option<ChannelId>,
    ) -> Result<Reply, SessionError> {
        let channel = user_channel.ok_or(SessionError::NoChannel)?;

        // Re-joining the current channel issues a redundant move; the
        // result is observably identical to a no-op.
        if let Some(conn) = session.connection.as_mut() {
            conn.move_to(channel).await?;
            return Ok(Reply::public(format!("Moved to {}.", channel.mention())));
        }

        let conn = self.gateway.connect(session.guild_id, channel).await?;
        session.connection = Some(conn);
        Ok(Reply::public(format!("Connected to {}.", channel.mention())))
    }

    async fn leave(&self, session: &mut GuildSession) -> Result<Reply, SessionError> {
        let Some(mut conn) = session.connection.take() else {
            return Err(SessionError::NotConnected);
        };
        // The session forgets the connection either way; a failed
        // disconnect still gets reported.
        session.source = None;
        conn.disconnect().await?;
        Ok(Reply::public("Disconnected."))
    }

    async fn play(
        &self,
        session: &mut GuildSession,
        user_channel: Option<ChannelId>,
    ) -> Result<Reply, SessionError> {
        let Some(url) = self.stream_url.clone() else {
            return Err(SessionError::StreamNotConfigured);
        };
        let channel = user_channel.ok_or(SessionError::NoChannel)?;

        if let Some(conn) = session.connection.as_mut() {
            if conn.channel() != channel {
                conn.move_to(channel).await?;
            }
        } else {
            let conn = self.gateway.connect(session.guild_id, channel).await?;
            session.connection = Some(conn);
        }
        let volume = session.volume();
        let Some(conn) = session.connection.as_mut() else {
            return Err(SessionError::NotConnected);
        };

        if conn.is_playing() {
            return Ok(Reply::public("The stream is already playing."));
        }

        session.source = None;
        let request = StreamRequest {
            url: &url,
            options: &self.stream_options,
            volume,
        };
        let source = conn.play(request).await?;
        session.source = Some(source);
        Ok(Reply::public("Playing the radio stream..."))
    }

    fn stop(&self, session: &mut GuildSession) -> Result<Reply, SessionError> {
        let Some(conn) = session.connection.as_mut() else {
            return Err(SessionError::NothingPlaying);
        };
        // A paused source is still live and can be stopped.
        if !conn.is_playing() && !conn.is_paused() {
            return Err(SessionError::NothingPlaying);
        }
        conn.stop();
        session.source = None;
        Ok(Reply::public("Playback stopped."))
    }

    fn pause(&self, session: &mut GuildSession) -> Result<Reply, SessionError> {
        let Some(conn) = session.connection.as_mut() else {
            return Err(SessionError::NothingPlaying);
        };
        if !conn.is_playing() {
            return Err(SessionError::NothingPlaying);
        }
        conn.pause()?;
        Ok(Reply::public("Playback paused."))
    }

    fn resume(&self, session: &mut GuildSession) -> Result<Reply, SessionError> {
        let Some(conn) = session.connection.as_mut() else {
            return Err(SessionError::NothingPaused);
        };
        if !conn.is_paused() {
            return Err(SessionError::NothingPaused);
        }
        conn.resume()?;
        Ok(Reply::public("Playback resumed."))
    }

    fn set_volume(&self, session: &mut GuildSession, value: f32) -> Result<Reply, SessionError> {
        if session.connection.is_none() {
            return Err(SessionError::NotConnected);
        }
        let Some(source) = session.source.as_ref() else {
            return Err(SessionError::NoActiveSource);
        };

        let value = crate::domain::entities::clamp_volume(value);
        match source {
            PlaybackSource::VolumeAdjustable(control) => {
                control.set_volume(value)?;
                let stored = session.set_volume(value);
                Ok(Reply::public(format!("Volume set to {:.1}", stored)))
            }
            PlaybackSource::Opaque => Err(SessionError::UnsupportedSource),
        }
    }

    fn status(&self, session: &GuildSession) -> Result<Reply, SessionError> {
        let Some(conn) = session.connection.as_ref() else {
            return Err(SessionError::NotConnected);
        };
        Ok(Reply::ephemeral(format!(
            "Connected to {} | playing={} | paused={}",
            conn.channel().mention(),
            conn.is_playing(),
            conn.is_paused()
        )))
    }
}
