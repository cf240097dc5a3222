use super::ids::ChannelId;

/// A single slash-command invocation, after the platform adapter has
/// resolved its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoiceCommand {
    Join,
    Leave,
    Play,
    Stop,
    Pause,
    Resume,
    SetVolume(f32),
    Status,
}

impl VoiceCommand {
    /// The slash-command name this invocation arrived under.
    pub fn name(&self) -> &'static str {
        match self {
            VoiceCommand::Join => "join",
            VoiceCommand::Leave => "leave",
            VoiceCommand::Play => "play",
            VoiceCommand::Stop => "stop",
            VoiceCommand::Pause => "pause",
            VoiceCommand::Resume => "resume",
            VoiceCommand::SetVolume(_) => "volume",
            VoiceCommand::Status => "status",
        }
    }
}

/// A command together with the invoking user's current voice channel,
/// if they are in one.
#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub command: VoiceCommand,
    pub user_channel: Option<ChannelId>,
}

impl Invocation {
    pub fn new(command: VoiceCommand) -> Self {
        Self {
            command,
            user_channel: None,
        }
    }

    pub fn with_channel(mut self, channel: ChannelId) -> Self {
        self.user_channel = Some(channel);
        self
    }
}

/// What goes back to the platform: response text plus visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub ephemeral: bool,
}

impl Reply {
    /// A reply visible to the whole channel.
    pub fn public(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    /// A reply visible only to the invoker.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}
