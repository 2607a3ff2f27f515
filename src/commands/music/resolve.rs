use super::*;
use crate::commands::music::audio_sources::SearchTerm;
use poise::CreateReply;
use poise::serenity_prelude::CreateEmbed;
use tracing::{info, warn};

/// Number of search terms listed in the reply embed.
const MAX_LISTED_TERMS: usize = 10;

/// Resolve a Spotify link or search text into tracks
#[poise::command(slash_command, category = "Music")]
pub async fn resolve(
    ctx: Context<'_>,
    #[description = "Spotify track/album/playlist link or search query"] query: String,
) -> CommandResult {
    info!("Received resolve command with query: {}", query);

    // Albums and playlists can take several requests
    ctx.defer().await?;

    let reply = match ctx.data().resolver.resolve_input(&query).await {
        Ok(terms) => CreateReply::default().embed(resolved_embed(&terms)),
        Err(err) => {
            warn!("Failed to resolve '{}': {}", query, err);
            CreateReply::default().embed(
                CreateEmbed::new()
                    .title("❌ Error")
                    .description(err.to_string())
                    .color(0xff0000),
            )
        }
    };

    ctx.send(reply).await?;

    Ok(())
}

fn resolved_embed(terms: &[SearchTerm]) -> CreateEmbed {
    let title = match terms.len() {
        1 => "🎵 Resolved 1 track".to_string(),
        n => format!("🎵 Resolved {} tracks", n),
    };

    CreateEmbed::new()
        .title(title)
        .description(format_term_list(terms))
        .color(0x00ff00)
}

/// Numbered list of the first few terms, with a count of the rest.
fn format_term_list(terms: &[SearchTerm]) -> String {
    if terms.is_empty() {
        return "Nothing to queue".to_string();
    }

    let mut list = terms
        .iter()
        .take(MAX_LISTED_TERMS)
        .enumerate()
        .map(|(i, term)| format!("`{}.` {}", i + 1, term))
        .collect::<Vec<_>>()
        .join("\n");

    if terms.len() > MAX_LISTED_TERMS {
        list.push_str(&format!("\n…and {} more", terms.len() - MAX_LISTED_TERMS));
    }

    list
}
