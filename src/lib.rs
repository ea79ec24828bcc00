pub mod commands;
pub mod config;
pub mod context;
pub mod forward;
pub mod models;
pub mod relay;
pub mod reminders;
pub mod routing;
pub mod store;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub store: std::sync::Arc<dyn store::Store>,
    pub relay: relay::ChatRelay,
    pub policy: routing::ChannelPolicy,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
