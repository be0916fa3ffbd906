//! Embed builders for command responses.
//!
//! The `*_lines` helpers produce the plain text bodies so they can be checked
//! without going through serenity's builders.

use crate::constants::EMBED_COLOUR;
use crate::database::models::{
    Category, Improvements, Player, Run, Scale, SegmentBestRecord, SegmentTimes,
};
use crate::speedrun::catalog::Segment;
use crate::speedrun::leaderboard::LeaderboardEntry;
use crate::speedrun::submission::{SegmentRunOutcome, SubmittedRun};
use crate::timing::ticks_to_display;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

const RANK_ICONS: [&str; 10] = [
    "🥇", "🥈", "🥉", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

pub fn rank_icon(rank: usize) -> &'static str {
    rank.checked_sub(1)
        .and_then(|i| RANK_ICONS.get(i))
        .copied()
        .unwrap_or("🔹")
}

pub fn runner_names(players: &[Player]) -> String {
    players
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn board_title(category: &Category, scale: &Scale) -> String {
    format!("{} ({} scale)", category.identifier, scale.identifier)
}

pub fn leaderboard_lines(entries: &[LeaderboardEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            format!(
                "{} | `{}` - **{}**",
                rank_icon(e.rank),
                ticks_to_display(e.run.ticks),
                runner_names(&e.players)
            )
        })
        .collect()
}

pub fn leaderboard_embed(
    category: &Category,
    scale: &Scale,
    entries: &[LeaderboardEntry],
) -> CreateEmbed {
    let description = if entries.is_empty() {
        "No runs have been submitted yet.".to_string()
    } else {
        leaderboard_lines(entries).join("\n\n")
    };
    CreateEmbed::new()
        .title(format!("Leaderboard for {}", board_title(category, scale)))
        .description(description)
        .color(EMBED_COLOUR)
}

/// Room split lines of one run, in layout order.
pub fn run_room_lines(rooms: &SegmentTimes) -> Vec<String> {
    rooms
        .iter()
        .map(|(segment, ticks)| format!("{segment}: `{}`", ticks_to_display(*ticks)))
        .collect()
}

/// Personal best card. `screenshot` should already be synced with disk.
/// `rooms` is empty for runs submitted as a single time.
pub fn pb_embed(
    player_name: &str,
    category: &Category,
    scale: &Scale,
    run: &Run,
    runners: &[Player],
    rooms: &SegmentTimes,
) -> CreateEmbed {
    let plural = if scale.value > 1 { "s" } else { "" };
    let description = format!(
        "### 🏃 Runner{plural}:\n**{}**\n\n### 🕐 Time:\n### `{}`",
        runner_names(runners),
        ticks_to_display(run.ticks)
    );
    let mut embed = CreateEmbed::new()
        .title(format!(
            "{player_name}'s personal best for {}",
            board_title(category, scale)
        ))
        .description(description)
        .color(EMBED_COLOUR)
        .timestamp(run.submitted_at);
    if !rooms.is_empty() {
        embed = embed.field("Rooms", run_room_lines(rooms).join("\n"), false);
    }
    if let Some(name) = &run.screenshot {
        embed = embed.image(format!("attachment://{name}"));
    }
    embed
}

pub fn submission_embed(submitted: &SubmittedRun) -> CreateEmbed {
    CreateEmbed::new()
        .title("Run submitted")
        .description(format!(
            "Submitted `{}` in {} with **{}**.",
            ticks_to_display(submitted.run.ticks),
            board_title(&submitted.category, &submitted.scale),
            runner_names(&submitted.players)
        ))
        .color(EMBED_COLOUR)
}

/// One line per improved room: `Tekton: 01:10.20 → 01:04.80`.
pub fn improvement_lines(improvements: &Improvements) -> Vec<String> {
    improvements
        .iter()
        .map(|(segment, change)| {
            format!(
                "{segment}: `{}` → `{}`",
                ticks_to_display(change.before),
                ticks_to_display(change.after)
            )
        })
        .collect()
}

pub fn room_submission_embed(outcome: &SegmentRunOutcome) -> CreateEmbed {
    let mut embed = submission_embed(&outcome.submitted);
    if outcome.duplicate {
        embed = embed.title("Run already recorded").description(format!(
            "`{}` was already on the board; room bests were checked again.",
            ticks_to_display(outcome.submitted.run.ticks)
        ));
    }
    for (player, improvements) in &outcome.improvements {
        let value = if improvements.is_empty() {
            "No new room personal bests.".to_string()
        } else {
            improvement_lines(improvements).join("\n")
        };
        embed = embed.field(format!("{} - new room PBs", player.name), value, false);
    }
    embed
}

pub fn room_pb_lines(layout: &[Segment], record: &SegmentBestRecord) -> Vec<String> {
    layout
        .iter()
        .map(|segment| format!("{segment}: `{}`", ticks_to_display(record.get(*segment))))
        .collect()
}

pub fn room_pbs_embed(
    player_name: &str,
    category: &Category,
    scale: &Scale,
    layout: &[Segment],
    record: &SegmentBestRecord,
) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!(
            "{player_name}'s room bests for {}",
            board_title(category, scale)
        ))
        .description(room_pb_lines(layout, record).join("\n"))
        .footer(CreateEmbedFooter::new(
            "Room bests may come from different runs.",
        ))
        .color(EMBED_COLOUR)
}
