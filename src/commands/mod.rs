//! Demo commands shipped with the binary.

mod attachments;
mod delete;
mod edit;
mod gmail;
mod help;
mod ping;
mod reply;
mod styles;
mod typing;


pub use attachments::AttachmentsCommand;
pub use delete::{DeleteCommand, ReceiveDeleteCommand};
pub use edit::EditCommand;
pub use gmail::{GmailCommand, GMAIL_ADDRESS};
pub use help::HelpCommand;
pub use ping::PingCommand;
pub use reply::ReplyCommand;
pub use styles::StylesCommand;
pub use typing::TypingCommand;

use crate::bot::triggers::{of_kind, regex_triggered, triggered, triggered_with_case};
use crate::bot::{Bot, ContactFilter, GroupFilter};
use signalbot_core::message::MessageType;

/// Register every demo command for all contacts and all groups.
pub async fn register_defaults(bot: &Bot) -> Result<(), regex::Error> {
    bot.register(
        PingCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["ping"])),
    )
    .await;
    bot.register(
        HelpCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["help"])),
    )
    .await;
    bot.register(
        EditCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered_with_case(&["edit"], true)),
    )
    .await;
    bot.register(
        DeleteCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["delete"])),
    )
    .await;
    bot.register(
        ReceiveDeleteCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(of_kind(MessageType::Delete)),
    )
    .await;
    bot.register(
        StylesCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["styles"])),
    )
    .await;
    bot.register(
        TypingCommand::default(),
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["typing"])),
    )
    .await;
    bot.register(
        ReplyCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["reply"])),
    )
    .await;
    bot.register(
        AttachmentsCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(triggered(&["attachments"])),
    )
    .await;
    bot.register(
        GmailCommand,
        ContactFilter::All,
        GroupFilter::All,
        Some(regex_triggered(&[GMAIL_ADDRESS])?),
    )
    .await;
    Ok(())
}
