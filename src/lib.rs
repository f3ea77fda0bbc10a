//! # signalbot
//!
//! Chat-bot framework for Signal. Register [`Command`]s on a [`Bot`], then
//! run it against a signal-cli-rest-api service.

pub mod bot;
pub mod commands;

pub use bot::{Bot, BotHandle, Command, ContactFilter, Context, GroupFilter};
pub use signalbot_core::{config, error, group, message, traits};
