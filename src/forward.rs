use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::routing::{InboundMessage, RouteDecision};
use crate::{context, Data, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

pub const LINK_PROMPT: &str =
    "🚧 Please link your account first in the web app before chatting here.";

/// Handle a gateway message event: filter, relay, reply.
pub async fn handle_message(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let inbound = InboundMessage {
        author_id: new_message.author.id.get(),
        author_is_bot: new_message.author.bot,
        guild_id: new_message.guild_id.map(|id| id.get()),
        channel_id: new_message.channel_id.get(),
    };

    match data.policy.decide(&inbound).await {
        RouteDecision::Ignore => return Ok(()),
        RouteDecision::PromptLink => {
            new_message.channel_id.say(&ctx.http, LINK_PROMPT).await?;
            return Ok(());
        }
        RouteDecision::Forward => {}
    }

    info!(
        "Forwarding message from {} in channel {}",
        new_message.author.id, new_message.channel_id
    );

    let user_id = new_message.author.id.to_string();
    let history = context::load_short_term_memory(
        data.store.as_ref(),
        &user_id,
        data.config.history_limit,
    )
    .await;

    let typing = new_message.channel_id.start_typing(&ctx.http);
    let reply = data.relay.relay(&user_id, &new_message.content, history).await;
    drop(typing);

    for chunk in split_message(&reply, DISCORD_MESSAGE_LIMIT) {
        new_message.channel_id.say(&ctx.http, chunk).await?;
    }

    Ok(())
}

/// Splits a reply into Discord-sized chunks on char boundaries.
fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for ch in content.chars() {
        if current.len() + ch.len_utf8() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
