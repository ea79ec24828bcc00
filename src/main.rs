use maibot::commands::{channel, identity};
use maibot::{config::Config, Data};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                identity::myid(),
                channel::setchannel(),
                channel::removechannel(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        if let Err(e) =
                            maibot::forward::handle_message(ctx, new_message, data).await
                        {
                            error!("Failed to handle message: {}", e);
                        }
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");

                // Registration replaces the full command set wholesale; a
                // failure is logged but does not halt startup.
                if let Err(e) =
                    poise::builtins::register_globally(ctx, &framework.options().commands).await
                {
                    error!("Failed to register slash commands: {}", e);
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let http_client = reqwest::Client::new();
                let store: Arc<dyn maibot::store::Store> = Arc::new(
                    maibot::store::RestStore::new(&config, http_client.clone()),
                );
                let relay = maibot::relay::ChatRelay::new(&config, http_client);

                let policy = maibot::routing::ChannelPolicy::new(
                    config.forward_scope,
                    config.require_link,
                    store.clone(),
                );
                match policy.hydrate().await {
                    Ok(n) => info!("Loaded {} channel bindings", n),
                    Err(e) => error!("Failed to hydrate channel bindings: {}", e),
                }

                let dispatcher = maibot::reminders::ReminderDispatcher::new(
                    store.clone(),
                    ctx.http.clone(),
                    config.reminder_interval_secs,
                    config.reminder_after_hours,
                );
                tokio::spawn(dispatcher.run());

                Ok(Data {
                    config,
                    store,
                    relay,
                    policy,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
