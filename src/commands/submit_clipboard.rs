//! `/submit_from_clipboard`: store a run from a pasted room-time export.

use super::options::{
    error_message, reply, reply_text, room_raid_type_option, runners_option, str_arg,
};
use super::runners::{parse_runner_mentions, resolve_runners};
use crate::AppState;
use crate::speedrun::submission::{SegmentSubmission, submit_segment_run};
use crate::ui::embeds::room_submission_embed;
use serenity::builder::{CreateCommand, CreateCommandOption, EditInteractionResponse};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::*;
use tracing::warn;

pub fn register() -> CreateCommand {
    CreateCommand::new("submit_from_clipboard")
        .description("Submit a run from the room times copied out of the game.")
        .add_option(room_raid_type_option())
        .add_option(runners_option("Every runner, as mentions separated by commas"))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "times",
                "The copied room times, including the team size",
            )
            .required(true),
        )
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "submit_from_clipboard", "missing_app_state");
        return;
    };
    let (Some(category), Some(runner_text), Some(paste)) = (
        str_arg(interaction, "raid_type"),
        str_arg(interaction, "runners"),
        str_arg(interaction, "times"),
    ) else {
        reply_text(ctx, interaction, "Missing raid type, runners or times.").await;
        return;
    };
    let Some(user_ids) = parse_runner_mentions(runner_text) else {
        reply_text(ctx, interaction, "Runners must be user mentions separated by commas.").await;
        return;
    };
    let Some(runners) = resolve_runners(ctx, interaction, &user_ids).await else {
        reply_text(ctx, interaction, "One of the runners could not be found.").await;
        return;
    };

    let submission = SegmentSubmission {
        category: category.to_string(),
        runners,
        paste: paste.to_string(),
    };
    match submit_segment_run(app_state.store.as_ref(), &submission).await {
        Ok(outcome) => {
            reply(
                ctx,
                interaction,
                EditInteractionResponse::new().embed(room_submission_embed(&outcome)),
            )
            .await
        }
        Err(e) => reply_text(ctx, interaction, error_message("submit_from_clipboard", &e)).await,
    }
}
