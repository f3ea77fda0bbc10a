use crate::bot::{Command, Context};
use async_trait::async_trait;
use std::time::Duration;

/// Shows the typing indicator for a while, then reports how long.
pub struct TypingCommand {
    pub duration: Duration,
}

impl Default for TypingCommand {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl Command for TypingCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.start_typing().await?;
        tokio::time::sleep(self.duration).await;
        ctx.stop_typing().await?;
        ctx.send(&format!("Typed for {}s", self.duration.as_secs()))
            .await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("typing: ⌨️ Demonstrates typing indicator for a few seconds.".into())
    }
}
