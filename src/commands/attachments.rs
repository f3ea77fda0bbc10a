use crate::bot::{Command, Context};
use async_trait::async_trait;
use signalbot_core::message::OutgoingMessage;
use tracing::warn;

/// Sends received attachments back, then removes them from the service.
pub struct AttachmentsCommand;

#[async_trait]
impl Command for AttachmentsCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        let received = &ctx.message.attachments;
        let reply = OutgoingMessage {
            attachments: received.clone(),
            ..OutgoingMessage::text(format!("Received {} attachment(s).", received.len()))
        };
        ctx.send_message(&reply).await?;

        for local_ref in &ctx.message.attachment_local_refs {
            if let Err(e) = ctx.bot().delete_attachment(local_ref).await {
                warn!("could not delete attachment {local_ref}: {e}");
            }
        }
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("attachments: 📎 Send your attachments back and delete them.".into())
    }
}
