use crate::bot::{Command, Context};
use async_trait::async_trait;
use signalbot_core::message::{OutgoingMessage, TextMode};

pub(super) const SAMPLES: [&str; 5] = [
    "**Bold style**",
    "*Italic style*",
    "~Strikethrough style~",
    "||Spoiler style||",
    "`Monospaced style`",
];

/// Sends one message per supported text style.
pub struct StylesCommand;

#[async_trait]
impl Command for StylesCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        for sample in SAMPLES {
            let mut message = OutgoingMessage::text(sample);
            message.text_mode = Some(TextMode::Styled);
            ctx.send_message(&message).await?;
        }
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("styles: 🎨 Show the text styles Signal supports.".into())
    }
}
