//! # signalbot-transport
//!
//! Client for [signal-cli-rest-api](https://github.com/bbernhard/signal-cli-rest-api):
//! REST for outbound calls, a WebSocket for the inbound envelope stream.

pub mod rest;

pub use rest::SignalApi;
