use crate::bot::{Command, Context};
use async_trait::async_trait;

/// Answers "ping" with "pong".
pub struct PingCommand;

#[async_trait]
impl Command for PingCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.send("pong").await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("ping: 🏓 Listen for a ping and send a pong reply.".into())
    }
}
