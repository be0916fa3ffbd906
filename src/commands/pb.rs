//! `/pb`: a player's personal best for a raid type and scale.

use super::options::{
    error_message, raid_type_option, reply, reply_text, scale_arg, scale_option, str_arg,
    user_arg,
};
use crate::AppState;
use crate::attachments::{screenshot_exists, screenshot_path};
use crate::database::RecordStore;
use crate::error::Result;
use crate::speedrun::runs::{PbSubject, find_personal_best, sync_screenshot};
use crate::speedrun::submission::resolve_reference;
use crate::ui::embeds::pb_embed;
use serenity::builder::{
    CreateAttachment, CreateCommand, CreateCommandOption, CreateEmbed, EditInteractionResponse,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn register() -> CreateCommand {
    CreateCommand::new("pb")
        .description("View a personal best.")
        .add_option(raid_type_option())
        .add_option(scale_option())
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "Whose personal best to show. Defaults to you.",
            )
            .required(false),
        )
}

enum PbView {
    NoRuns(String),
    Found {
        embed: CreateEmbed,
        screenshot: Option<PathBuf>,
    },
}

async fn load_pb(
    store: &dyn RecordStore,
    dir: &Path,
    category_name: &str,
    scale_value: i32,
    user_id: UserId,
    external_id: i64,
) -> Result<PbView> {
    let (category, scale) = resolve_reference(store, category_name, scale_value).await?;
    let no_runs = || {
        PbView::NoRuns(format!(
            "<@{user_id}> has no {} runs at {} scale.",
            category.identifier, scale.identifier
        ))
    };
    let Some(player) = store.find_player_by_external_id(external_id).await? else {
        return Ok(no_runs());
    };
    let Some(run) = find_personal_best(
        store,
        category.raid_type_id,
        scale.scale_id,
        PbSubject::Player(player.player_id),
    )
    .await?
    else {
        return Ok(no_runs());
    };
    let run = sync_screenshot(store, run, |name| screenshot_exists(dir, name)).await?;
    let runners = store.group_players(run.player_group_id).await?;
    let rooms = store.run_segments(run.run_id).await?;
    Ok(PbView::Found {
        embed: pb_embed(&player.name, &category, &scale, &run, &runners, &rooms),
        screenshot: run.screenshot.as_deref().map(|name| screenshot_path(dir, name)),
    })
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "pb", "missing_app_state");
        return;
    };
    let (Some(category_name), Some(scale_value)) =
        (str_arg(interaction, "raid_type"), scale_arg(interaction))
    else {
        reply_text(ctx, interaction, "Missing raid type or scale.").await;
        return;
    };
    let user_id = user_arg(interaction, "user").unwrap_or(interaction.user.id);
    let Ok(external_id) = i64::try_from(user_id.get()) else {
        reply_text(ctx, interaction, "Unknown user.").await;
        return;
    };

    let dir = app_state.config.attachments_dir.as_path();
    let view = load_pb(
        app_state.store.as_ref(),
        dir,
        category_name,
        scale_value,
        user_id,
        external_id,
    )
    .await;

    match view {
        Ok(PbView::NoRuns(text)) => reply_text(ctx, interaction, text).await,
        Ok(PbView::Found { embed, screenshot }) => {
            let mut builder = EditInteractionResponse::new().embed(embed);
            if let Some(path) = screenshot {
                match CreateAttachment::path(&path).await {
                    Ok(file) => builder = builder.new_attachment(file),
                    Err(e) => {
                        warn!(target: "commands", path = %path.display(), error = ?e, "failed to attach screenshot")
                    }
                }
            }
            reply(ctx, interaction, builder).await;
        }
        Err(e) => reply_text(ctx, interaction, error_message("pb", &e)).await,
    }
}
