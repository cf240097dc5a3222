//! Discord gateway adapter
//!
//! Registers the slash commands, translates interactions into domain
//! invocations and sends the controller's reply back. All Discord types
//! stay on this side of the boundary.

pub mod voice;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateApplicationCommands;
use serenity::client::{Context, EventHandler};
use serenity::model::application::command::{Command, CommandOptionType};
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOptionValue,
};
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId as SerenityGuildId;

use crate::application::services::SessionController;
use crate::domain::entities::{ChannelId, GuildId, Invocation, Reply, VoiceCommand};

pub use voice::SongbirdGateway;

pub struct Handler {
    controller: Arc<SessionController>,
    guild_id: Option<u64>,
}

impl Handler {
    pub fn new(controller: Arc<SessionController>, guild_id: Option<u64>) -> Self {
        Self {
            controller,
            guild_id,
        }
    }

    async fn execute(&self, ctx: &Context, command: &ApplicationCommandInteraction) -> Reply {
        let Some(guild_id) = command.guild_id else {
            return Reply::ephemeral("This command only works in a server.");
        };

        let number = command
            .data
            .options
            .first()
            .and_then(|option| option.resolved.as_ref())
            .and_then(|value| match value {
                CommandDataOptionValue::Number(n) => Some(*n),
                _ => None,
            });
        let Some(voice_command) = parse_command(&command.data.name, number) else {
            return Reply::ephemeral("Unknown command.");
        };

        // The caller's current voice channel, from the gateway cache.
        let user_channel = ctx
            .cache
            .guild(guild_id)
            .and_then(|guild| {
                guild
                    .voice_states
                    .get(&command.user.id)
                    .and_then(|state| state.channel_id)
            })
            .map(|channel| ChannelId(channel.0));

        let invocation = match user_channel {
            Some(channel) => Invocation::new(voice_command).with_channel(channel),
            None => Invocation::new(voice_command),
        };
        self.controller.dispatch(GuildId(guild_id.0), invocation).await
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Connected as {}", ready.user.name);

        let result = match self.guild_id {
            Some(guild) => {
                SerenityGuildId(guild)
                    .set_application_commands(&ctx.http, build_commands)
                    .await
            }
            None => Command::set_global_application_commands(&ctx.http, build_commands).await,
        };

        match result {
            Ok(commands) => {
                let scope = match self.guild_id {
                    Some(guild) => format!("in guild {}", guild),
                    None => "globally".to_string(),
                };
                tracing::info!("Registered {} slash commands {}", commands.len(), scope);
            }
            Err(e) => tracing::error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };

        let reply = self.execute(&ctx, &command).await;
        let result = command
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message.content(&reply.text).ephemeral(reply.ephemeral)
                    })
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Failed to respond to /{}: {}", command.data.name, e);
        }
    }
}

fn build_commands(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    commands
        .create_application_command(|c| c.name("join").description("Join your voice channel"))
        .create_application_command(|c| c.name("leave").description("Leave the voice channel"))
        .create_application_command(|c| c.name("play").description("Play the radio stream"))
        .create_application_command(|c| c.name("stop").description("Stop playback"))
        .create_application_command(|c| c.name("pause").description("Pause playback"))
        .create_application_command(|c| c.name("resume").description("Resume playback"))
        .create_application_command(|c| {
            c.name("volume")
                .description("Set playback volume (0.0 to 2.0)")
                .create_option(|option| {
                    option
                        .name("level")
                        .description("Volume level")
                        .kind(CommandOptionType::Number)
                        .required(true)
                })
        })
        .create_application_command(|c| c.name("status").description("Show the current session"))
}

fn parse_command(name: &str, number: Option<f64>) -> Option<VoiceCommand> {
    match name {
        "join" => Some(VoiceCommand::Join),
        "leave" => Some(VoiceCommand::Leave),
        "play" => Some(VoiceCommand::Play),
        "stop" => Some(VoiceCommand::Stop),
        "pause" => Some(VoiceCommand::Pause),
        "resume" => Some(VoiceCommand::Resume),
        "volume" => number.map(|level| VoiceCommand::SetVolume(level as f32)),
        "status" => Some(VoiceCommand::Status),
        _ => None,
    }
}
