//! Runner lists given as mention text, e.g. `<@123>, <@!456>`.

use crate::speedrun::players::RunnerIdentity;
use serenity::model::application::CommandInteraction;
use serenity::model::id::UserId;
use serenity::prelude::Context;
use tracing::debug;

fn parse_mention(raw: &str) -> Option<u64> {
    let inner = raw.trim().strip_prefix("<@")?.strip_suffix('>')?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);
    digits.parse::<u64>().ok().filter(|id| *id > 0)
}

/// Parses comma separated user mentions. Any malformed entry rejects the list.
pub fn parse_runner_mentions(text: &str) -> Option<Vec<u64>> {
    let ids = text
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_mention)
        .collect::<Option<Vec<_>>>()?;
    (!ids.is_empty()).then_some(ids)
}

pub fn external_ids(user_ids: &[u64]) -> Option<Vec<i64>> {
    user_ids.iter().map(|id| i64::try_from(*id).ok()).collect()
}

/// Looks up each runner's server display name, falling back to the account name.
pub async fn resolve_runners(
    ctx: &Context,
    interaction: &CommandInteraction,
    user_ids: &[u64],
) -> Option<Vec<RunnerIdentity>> {
    let mut runners = Vec::with_capacity(user_ids.len());
    for &raw in user_ids {
        let external_id = i64::try_from(raw).ok()?;
        let user_id = UserId::new(raw);
        let member = match interaction.guild_id {
            Some(guild) => guild.member(&ctx.http, user_id).await.ok(),
            None => None,
        };
        let name = match member {
            Some(member) => member.display_name().to_string(),
            None => match user_id.to_user(&ctx.http).await {
                Ok(user) => user.name,
                Err(e) => {
                    debug!(target: "commands", %user_id, error = ?e, "runner lookup failed");
                    return None;
                }
            },
        };
        runners.push(RunnerIdentity::new(external_id, name));
    }
    Some(runners)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_mention_forms() {
        assert_eq!(
            parse_runner_mentions("<@123>, <@!456>,<@789>"),
            Some(vec![123, 456, 789])
        );
    }

    #[test]
    fn rejects_malformed_lists() {
        assert_eq!(parse_runner_mentions(""), None);
        assert_eq!(parse_runner_mentions("<@123>, bob"), None);
        assert_eq!(parse_runner_mentions("<@0>"), None);
        assert_eq!(parse_runner_mentions("<@&123>"), None);
    }
}
