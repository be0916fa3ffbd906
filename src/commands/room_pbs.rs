//! `/room_pbs`: a player's best time for every tracked room.

use super::options::{
    error_message, reply, reply_text, room_raid_type_option, scale_arg, scale_option, str_arg,
    user_arg,
};
use crate::AppState;
use crate::database::RecordStore;
use crate::error::{Result, SpeedrunError};
use crate::speedrun::catalog::segment_layout;
use crate::speedrun::room_pbs::current_bests;
use crate::speedrun::submission::resolve_reference;
use crate::ui::embeds::room_pbs_embed;
use serenity::builder::{CreateCommand, CreateCommandOption, CreateEmbed, EditInteractionResponse};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::*;
use tracing::warn;

pub fn register() -> CreateCommand {
    CreateCommand::new("room_pbs")
        .description("View personal bests for every room of a raid.")
        .add_option(room_raid_type_option())
        .add_option(scale_option())
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "Whose room bests to show. Defaults to you.",
            )
            .required(false),
        )
}

async fn load_room_pbs(
    store: &dyn RecordStore,
    category_name: &str,
    scale_value: i32,
    external_id: i64,
) -> Result<Option<CreateEmbed>> {
    let layout = segment_layout(category_name)
        .ok_or_else(|| SpeedrunError::NotSegmentCapable(category_name.to_string()))?;
    let (category, scale) = resolve_reference(store, category_name, scale_value).await?;
    let Some(player) = store.find_player_by_external_id(external_id).await? else {
        return Ok(None);
    };
    let Some(record) = current_bests(store, player.player_id, &category, &scale)
        .await?
        .filter(|r| !r.times.is_empty())
    else {
        return Ok(None);
    };
    Ok(Some(room_pbs_embed(
        &player.name,
        &category,
        &scale,
        layout,
        &record,
    )))
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "room_pbs", "missing_app_state");
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

    match load_room_pbs(app_state.store.as_ref(), category_name, scale_value, external_id).await {
        Ok(Some(embed)) => reply(ctx, interaction, EditInteractionResponse::new().embed(embed)).await,
        Ok(None) => {
            reply_text(
                ctx,
                interaction,
                format!("<@{user_id}> has no room times for {category_name} at that scale."),
            )
            .await
        }
        Err(e) => reply_text(ctx, interaction, error_message("room_pbs", &e)).await,
    }
}
