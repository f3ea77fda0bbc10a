use crate::bot::{Command, Context};
use async_trait::async_trait;

/// Quotes the triggering message.
pub struct ReplyCommand;

#[async_trait]
impl Command for ReplyCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.reply("This is a reply.").await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("reply: 💬 Reply to a message.".into())
    }
}
