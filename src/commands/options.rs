//! Option builders and readers shared by the slash commands.

use crate::error::SpeedrunError;
use crate::speedrun::catalog::{CATEGORIES, SCALES, segment_capable_categories};
use crate::timing::GameTime;
use serenity::builder::{CreateCommandOption, EditInteractionResponse};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::channel::Attachment;
use serenity::model::id::UserId;
use serenity::prelude::Context;
use tracing::{error, warn};

pub fn raid_type_option() -> CreateCommandOption {
    CATEGORIES.iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "raid_type", "The raid type")
            .required(true),
        |option, name| option.add_string_choice(*name, *name),
    )
}

/// Only raid types with room tracking.
pub fn room_raid_type_option() -> CreateCommandOption {
    segment_capable_categories().fold(
        CreateCommandOption::new(CommandOptionType::String, "raid_type", "The raid type")
            .required(true),
        |option, name| option.add_string_choice(name, name),
    )
}

pub fn scale_option() -> CreateCommandOption {
    SCALES.iter().fold(
        CreateCommandOption::new(CommandOptionType::Integer, "scale", "The team size")
            .required(true),
        |option, (value, label)| option.add_int_choice(*label, *value),
    )
}

pub fn runners_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "runners", description).required(true)
}

/// `minutes`, `seconds` and `tenths` options for an in-game time.
pub fn time_options() -> [CreateCommandOption; 3] {
    [
        CreateCommandOption::new(CommandOptionType::Integer, "minutes", "Minutes")
            .required(true)
            .min_int_value(0),
        CreateCommandOption::new(CommandOptionType::Integer, "seconds", "Seconds")
            .required(true)
            .min_int_value(0)
            .max_int_value(59),
        CreateCommandOption::new(CommandOptionType::Integer, "tenths", "Tenths of a second")
            .required(true)
            .min_int_value(0)
            .max_int_value(9),
    ]
}

pub fn str_arg<'a>(interaction: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    interaction
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

pub fn int_arg(interaction: &CommandInteraction, name: &str) -> Option<i64> {
    interaction
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_i64())
}

pub fn user_arg(interaction: &CommandInteraction, name: &str) -> Option<UserId> {
    interaction
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_user_id())
}

pub fn attachment_arg<'a>(interaction: &'a CommandInteraction, name: &str) -> Option<&'a Attachment> {
    let id = interaction
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_attachment_id())?;
    interaction.data.resolved.attachments.get(&id)
}

/// Party size from the `scale` option.
pub fn scale_arg(interaction: &CommandInteraction) -> Option<i32> {
    int_arg(interaction, "scale").and_then(|v| i32::try_from(v).ok())
}

/// Reads the three time options. Negative or oversized values give `None`.
pub fn time_arg(interaction: &CommandInteraction) -> Option<GameTime> {
    let part = |name| int_arg(interaction, name).and_then(|v| u32::try_from(v).ok());
    Some(GameTime::new(
        part("minutes")?,
        part("seconds")?,
        part("tenths")?,
    ))
}

/// User facing text for an engine error. Storage failures are logged and hidden.
pub fn error_message(command: &str, e: &SpeedrunError) -> String {
    if e.is_user_error() {
        e.to_string()
    } else {
        error!(target: "commands", command, error = %e, "command failed");
        "Something went wrong while talking to the database. Please try again later.".to_string()
    }
}

pub async fn reply(ctx: &Context, interaction: &CommandInteraction, builder: EditInteractionResponse) {
    if let Err(e) = interaction.edit_response(&ctx.http, builder).await {
        warn!(target: "commands", command = %interaction.data.name, error = ?e, "failed to edit response");
    }
}

pub async fn reply_text(ctx: &Context, interaction: &CommandInteraction, text: impl Into<String>) {
    reply(ctx, interaction, EditInteractionResponse::new().content(text)).await;
}
