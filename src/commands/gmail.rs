use crate::bot::{Command, Context};
use async_trait::async_trait;

/// Matches messages that consist of a Gmail address.
pub const GMAIL_ADDRESS: &str = r"^[\w\.-]+@gmail\.com$";

/// Reacts to a Gmail address, registered through a regex trigger.
pub struct GmailCommand;

#[async_trait]
impl Command for GmailCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.send("Detected a Gmail address!").await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some(format!("{GMAIL_ADDRESS}: 😤 Regular expression trigger example."))
    }
}
