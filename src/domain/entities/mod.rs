//! Domain entities - Core session objects with no platform dependencies

pub mod command;
pub mod ids;
pub mod session;

pub use command::{Invocation, Reply, VoiceCommand};
pub use ids::{ChannelId, GuildId};
pub use session::{clamp_volume, GuildSession, PlaybackSource, SessionEvent, SessionState, DEFAULT_VOLUME};
