use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Bind Mai's replies to a channel in this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    ephemeral
)]
pub async fn setchannel(
    ctx: Context<'_>,
    #[description = "Channel Mai should reply in"] channel: serenity::ChannelId,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    match ctx.data().policy.set_channel(guild_id.get(), channel.get()).await {
        Ok(()) => {
            ctx.say(format!("✅ Mai will now reply in <#{}>.", channel))
                .await?;
        }
        Err(e) => {
            error!("Failed to persist channel binding for guild {}: {}", guild_id, e);
            ctx.say(format!(
                "⚠️ Mai will reply in <#{}> for now, but saving the setting failed. It may reset on restart.",
                channel
            ))
            .await?;
        }
    }

    Ok(())
}

/// Unbind the reply channel for this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    ephemeral
)]
pub async fn removechannel(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    match ctx.data().policy.remove_channel(guild_id.get()).await {
        Ok(()) => {
            ctx.say("✅ Reply channel removed. Mai will stay quiet in this server.")
                .await?;
        }
        Err(e) => {
            error!("Failed to remove channel binding for guild {}: {}", guild_id, e);
            ctx.say("⚠️ Reply channel removed for now, but updating the store failed. It may come back on restart.")
                .await?;
        }
    }

    Ok(())
}
