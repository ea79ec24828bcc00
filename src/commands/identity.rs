use crate::{Context, Error};

/// Display your Discord user ID
#[poise::command(slash_command, ephemeral)]
pub async fn myid(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("👤 Your Discord ID is: `{}`", ctx.author().id))
        .await?;
    Ok(())
}
