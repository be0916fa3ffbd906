//! `/delete_run`: remove one exact run. Admins only.

use super::options::{
    error_message, raid_type_option, reply_text, runners_option, scale_arg, scale_option,
    str_arg, time_arg, time_options,
};
use super::runners::{external_ids, parse_runner_mentions};
use crate::AppState;
use crate::speedrun::submission::delete_submitted_run;
use crate::timing::ticks_to_display;
use serenity::builder::CreateCommand;
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;
use tracing::{info, warn};

pub fn register() -> CreateCommand {
    let [minutes, seconds, tenths] = time_options();
    CreateCommand::new("delete_run")
        .description("Delete a submitted run (admin only).")
        .add_option(raid_type_option())
        .add_option(scale_option())
        .add_option(runners_option("The runners of the run, as mentions separated by commas"))
        .add_option(minutes)
        .add_option(seconds)
        .add_option(tenths)
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer_ephemeral(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "delete_run", "missing_app_state");
        return;
    };
    if !app_state.config.is_admin(interaction.user.id.get()) {
        reply_text(ctx, interaction, "You are not permitted to delete runs.").await;
        return;
    }

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
    let Some(ids) = parse_runner_mentions(runner_text).and_then(|ids| external_ids(&ids)) else {
        reply_text(ctx, interaction, "Runners must be user mentions separated by commas.").await;
        return;
    };

    match delete_submitted_run(app_state.store.as_ref(), category, scale, &ids, time).await {
        Ok(Some(run)) => {
            info!(
                target: "commands",
                admin = %interaction.user.id,
                run = %run.run_id,
                "run deleted by admin"
            );
            reply_text(
                ctx,
                interaction,
                format!("Deleted the `{}` run.", ticks_to_display(run.ticks)),
            )
            .await;
        }
        Ok(None) => reply_text(ctx, interaction, "No matching run was found.").await,
        Err(e) => reply_text(ctx, interaction, error_message("delete_run", &e)).await,
    }
}
