//! # signalbot-core
//!
//! Core types, envelope decoding, traits, configuration, and error handling
//! for the signalbot framework.

pub mod config;
pub mod envelope;
pub mod error;
pub mod group;
pub mod message;
pub mod traits;

pub use config::shellexpand;
