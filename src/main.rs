use std::sync::Arc;

use anyhow::Context as _;
use raidtimes::config::Config;
use raidtimes::database::{PgStore, init};
use raidtimes::speedrun::catalog::missing_reference_data;
use raidtimes::{AppState, handler};
use serenity::model::gateway::GatewayIntents;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine when the variables come from the environment.
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let pool = init::connect(&config.database_url, config.database_max_connections).await?;

    let store = Arc::new(PgStore::new(pool));
    let missing = missing_reference_data(store.as_ref()).await?;
    if !missing.is_empty() {
        warn!(target: "startup", missing = ?missing, "reference data not seeded");
    }

    let allowed_guild_id = GuildId::new(config.guild_id);
    let token = config.discord_token.clone();
    let app_state = Arc::new(AppState::new(store, config));

    // Slash commands only need the GUILDS intent.
    let mut client = Client::builder(&token, GatewayIntents::GUILDS)
        .event_handler(handler::Handler { allowed_guild_id })
        .await
        .context("error creating the Discord client")?;

    {
        let mut data = client.data.write().await;
        data.insert::<AppState>(app_state);
    }

    if let Err(why) = client.start().await {
        error!(target: "startup", error = ?why, "client error");
        return Err(why.into());
    }
    Ok(())
}
