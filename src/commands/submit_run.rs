//! `/submit_run`: store a completion time with an optional screenshot.

use super::options::{
    attachment_arg, error_message, raid_type_option, reply, reply_text, runners_option,
    scale_arg, scale_option, str_arg, time_arg, time_options,
};
use super::runners::{parse_runner_mentions, resolve_runners};
use crate::AppState;
use crate::attachments::{save_screenshot, screenshot_name};
use crate::speedrun::submission::{TimedSubmission, submit_timed_run};
use crate::ui::embeds::submission_embed;
use serenity::builder::{CreateCommand, CreateCommandOption, EditInteractionResponse};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::*;
use tracing::warn;

pub fn register() -> CreateCommand {
    let [minutes, seconds, tenths] = time_options();
    CreateCommand::new("submit_run")
        .description("Submit a raid completion time.")
        .add_option(raid_type_option())
        .add_option(scale_option())
        .add_option(runners_option("Every runner, as mentions separated by commas"))
        .add_option(minutes)
        .add_option(seconds)
        .add_option(tenths)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Attachment,
                "screenshot",
                "A PNG or JPEG screenshot of the time",
            )
            .required(false),
        )
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "submit_run", "missing_app_state");
        return;
    };

    let (Some(category), Some(scale), Some(runner_text)) = (
        str_arg(interaction, "raid_type"),
        scale_arg(interaction),
        str_arg(interaction, "runners"),
    ) else {
        reply_text(ctx, interaction, "Missing raid type, scale or runners.").await;
        return;
    };
    let Some(time) = time_arg(interaction) else {
        reply_text(ctx, interaction, "The time submitted is not a possible in-game time.").await;
        return;
    };
    let Some(user_ids) = parse_runner_mentions(runner_text) else {
        reply_text(ctx, interaction, "Runners must be user mentions separated by commas.").await;
        return;
    };

    let attachment = attachment_arg(interaction, "screenshot");
    let screenshot = match attachment {
        Some(a) => match screenshot_name(a.id.get(), a.content_type.as_deref()) {
            Some(name) => Some(name),
            None => {
                reply_text(ctx, interaction, "Screenshots must be PNG or JPEG images.").await;
                return;
            }
        },
        None => None,
    };

    let Some(runners) = resolve_runners(ctx, interaction, &user_ids).await else {
        reply_text(ctx, interaction, "One of the runners could not be found.").await;
        return;
    };

    let submission = TimedSubmission {
        category: category.to_string(),
        scale,
        runners,
        time,
        screenshot,
    };
    match submit_timed_run(app_state.store.as_ref(), &submission).await {
        Ok(submitted) => {
            if let (Some(a), Some(name)) = (attachment, submitted.run.screenshot.as_deref()) {
                let dir = &app_state.config.attachments_dir;
                match a.download().await {
                    Ok(bytes) => {
                        if let Err(e) = save_screenshot(dir, name, &bytes).await {
                            warn!(target: "commands", file = name, error = ?e, "failed to save screenshot");
                        }
                    }
                    Err(e) => {
                        warn!(target: "commands", file = name, error = ?e, "failed to download screenshot")
                    }
                }
            }
            reply(
                ctx,
                interaction,
                EditInteractionResponse::new().embed(submission_embed(&submitted)),
            )
            .await;
        }
        Err(e) => reply_text(ctx, interaction, error_message("submit_run", &e)).await,
    }
}
