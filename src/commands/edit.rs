use crate::bot::{Command, Context};
use async_trait::async_trait;

/// Replies, then edits its own reply.
pub struct EditCommand;

#[async_trait]
impl Command for EditCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        let timestamp = ctx.reply("This message will be edited.").await?;
        ctx.edit("This message has been edited.", timestamp).await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("edit: ✏️ Send a reply and edit it.".into())
    }
}
