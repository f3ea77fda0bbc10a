use crate::bot::{Command, Context};
use anyhow::Context as _;
use async_trait::async_trait;
use chrono::DateTime;

/// Replies, then deletes its own reply for everyone.
pub struct DeleteCommand;

#[async_trait]
impl Command for DeleteCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        let timestamp = ctx.reply("This message will be deleted.").await?;
        ctx.remote_delete(timestamp).await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("delete: 🗑️ Send a reply and delete it.".into())
    }
}

/// Tells the sender when the message they just deleted was sent.
pub struct ReceiveDeleteCommand;

pub(super) fn deleted_notice(sent_at_millis: i64) -> anyhow::Result<String> {
    let sent_at = DateTime::from_timestamp_millis(sent_at_millis)
        .with_context(|| format!("timestamp {sent_at_millis} out of range"))?;
    Ok(format!(
        "You've deleted a message, which was sent at {}.",
        sent_at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
    ))
}

#[async_trait]
impl Command for ReceiveDeleteCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        let Some(sent_at) = ctx.message.remote_delete_timestamp else {
            return Ok(());
        };
        ctx.reply(&deleted_notice(sent_at)?).await?;
        Ok(())
    }
}
