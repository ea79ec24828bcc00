//! Hourly nudge loop: every linked user whose last recorded interaction is
//! older than the staleness threshold gets a DM, templated on the emotion
//! tag of that last interaction.

use crate::store::Store;
use anyhow::Context as AnyhowContext;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serenity::all::UserId;
use serenity::http::Http;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error};

pub struct ReminderDispatcher {
    store: Arc<dyn Store>,
    http: Arc<Http>,
    poll_interval: Duration,
    stale_after: ChronoDuration,
}

impl ReminderDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        http: Arc<Http>,
        poll_interval_secs: u64,
        stale_after_hours: i64,
    ) -> Self {
        Self {
            store,
            http,
            poll_interval: Duration::from_secs(poll_interval_secs),
            stale_after: ChronoDuration::hours(stale_after_hours),
        }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        // Single-flight: a slow cycle drops overlapping ticks instead of
        // stacking runs.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = self.dispatch_due().await {
                error!("Reminder cycle failed: {}", e);
            }
        }
    }

    async fn dispatch_due(&self) -> anyhow::Result<()> {
        let links = self.store.list_user_links().await?;
        debug!("Reminder cycle: checking {} linked users", links.len());

        for link in links {
            if let Err(e) = self.remind_user(&link.discord_user_id).await {
                error!("Failed to send reminder to {}: {}", link.discord_user_id, e);
            }
        }

        Ok(())
    }

    async fn remind_user(&self, discord_user_id: &str) -> anyhow::Result<()> {
        let Some(last) = self
            .store
            .recent_messages(discord_user_id, 1)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(());
        };

        if !is_stale(last.created_at, Utc::now(), self.stale_after) {
            return Ok(());
        }

        let text = reminder_text(last.emotion.as_deref());
        let user_id: u64 = discord_user_id
            .parse()
            .with_context(|| format!("Invalid linked user id '{}'", discord_user_id))?;

        let dm = UserId::new(user_id).create_dm_channel(&self.http).await?;
        dm.id
            .say(&self.http, format!("{}\n\n💬 Come chat with me!", text))
            .await?;

        debug!(
            "Reminder sent to {} (last emotion={:?})",
            discord_user_id, last.emotion
        );
        Ok(())
    }
}

fn is_stale(last: DateTime<Utc>, now: DateTime<Utc>, stale_after: ChronoDuration) -> bool {
    now - last >= stale_after
}

/// Template per emotion tag of the user's last interaction. Unknown or
/// missing tags fall back to the Normal template.
fn reminder_text(emotion: Option<&str>) -> &'static str {
    match emotion {
        Some("Angry") => "Hey… I remember you seemed upset last time. I’m here if you want to talk.",
        Some("Sad") => "You sounded a bit down yesterday. Want to chat and cheer up?",
        Some("Happy") => "You were in a great mood last time—miss that energy!",
        Some("Flirty") => "I’ve been thinking about you… care to continue where we left off?",
        Some("Loving") => "Feeling affectionate—is there something you want to share?",
        Some("Excited") => "You were excited last time—got any new fun stories?",
        _ => "It’s been a while! Curious what’s on your mind today.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: &str = "It’s been a while! Curious what’s on your mind today.";

    #[test]
    fn test_template_selection() {
        assert_eq!(
            reminder_text(Some("Sad")),
            "You sounded a bit down yesterday. Want to chat and cheer up?"
        );
        assert_eq!(reminder_text(Some("Normal")), NORMAL);
        assert_eq!(reminder_text(Some("Unknown")), NORMAL);
        assert_eq!(reminder_text(None), NORMAL);
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let threshold = ChronoDuration::hours(24);

        assert!(is_stale(now - ChronoDuration::hours(25), now, threshold));
        assert!(!is_stale(now - ChronoDuration::hours(1), now, threshold));
        // Exactly at the threshold counts as stale
        assert!(is_stale(now - ChronoDuration::hours(24), now, threshold));
    }
}
