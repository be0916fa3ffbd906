//! `/leaderboards`: the fastest groups for a raid type and scale.

use super::options::{
    error_message, raid_type_option, reply, reply_text, scale_arg, scale_option, str_arg,
};
use crate::AppState;
use crate::constants::LEADERBOARD_LIMIT;
use crate::database::RecordStore;
use crate::error::Result;
use crate::speedrun::leaderboard::top_with_players;
use crate::speedrun::submission::resolve_reference;
use crate::ui::embeds::leaderboard_embed;
use serenity::builder::{CreateCommand, CreateEmbed, EditInteractionResponse};
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;
use tracing::warn;

pub fn register() -> CreateCommand {
    CreateCommand::new("leaderboards")
        .description("View the fastest times for a raid type and scale.")
        .add_option(raid_type_option())
        .add_option(scale_option())
}

async fn load_board(
    store: &dyn RecordStore,
    category_name: &str,
    scale_value: i32,
) -> Result<CreateEmbed> {
    let (category, scale) = resolve_reference(store, category_name, scale_value).await?;
    let entries =
        top_with_players(store, category.raid_type_id, scale.scale_id, LEADERBOARD_LIMIT).await?;
    Ok(leaderboard_embed(&category, &scale, &entries))
}

pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    interaction.defer(&ctx.http).await.ok();
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "leaderboards", "missing_app_state");
        return;
    };
    let (Some(category_name), Some(scale_value)) =
        (str_arg(interaction, "raid_type"), scale_arg(interaction))
    else {
        reply_text(ctx, interaction, "Missing raid type or scale.").await;
        return;
    };

    let result = load_board(app_state.store.as_ref(), category_name, scale_value).await;

    match result {
        Ok(embed) => reply(ctx, interaction, EditInteractionResponse::new().embed(embed)).await,
        Err(e) => reply_text(ctx, interaction, error_message("leaderboards", &e)).await,
    }
}
