use crate::bot::{Command, Context};
use async_trait::async_trait;

/// Lists the help line of every registered command that has one.
pub struct HelpCommand;

pub(super) fn render_help(descriptions: &[String]) -> String {
    let mut text = String::from("Available commands:\n");
    for line in descriptions {
        text.push_str(&format!("\t - {line}\n"));
    }
    text
}

#[async_trait]
impl Command for HelpCommand {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        let descriptions = ctx.bot().describe_commands().await;
        ctx.send(&render_help(&descriptions)).await?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some("help: 🆘 Shows information about available commands.".into())
    }
}
