use crate::commands;
use serenity::async_trait;
use serenity::client::Context;
use serenity::model::application::Interaction;
use serenity::model::{gateway::Ready, id::GuildId};
use serenity::prelude::EventHandler;
use tracing::{error, info, warn};

pub struct Handler {
    pub allowed_guild_id: GuildId,
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = &interaction else {
            return;
        };
        if command.guild_id != Some(self.allowed_guild_id) {
            warn!(target: "handler", command = %command.data.name, "ignoring command from another guild");
            return;
        }
        match command.data.name.as_str() {
            "submit_run" => commands::submit_run::run_slash(&ctx, command).await,
            "delete_run" => commands::delete_run::run_slash(&ctx, command).await,
            "leaderboards" => commands::leaderboards::run_slash(&ctx, command).await,
            "pb" => commands::pb::run_slash(&ctx, command).await,
            "submit_from_clipboard" => commands::submit_clipboard::run_slash(&ctx, command).await,
            "room_pbs" => commands::room_pbs::run_slash(&ctx, command).await,
            other => warn!(target: "handler", command = other, "unknown command"),
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(target: "handler", user = %ready.user.name, "connected and ready");
        match self
            .allowed_guild_id
            .set_commands(&ctx.http, commands::register_all())
            .await
        {
            Ok(registered) => {
                info!(target: "handler", count = registered.len(), "registered guild commands")
            }
            Err(e) => error!(target: "handler", error = ?e, "error creating guild commands"),
        }
    }
}
