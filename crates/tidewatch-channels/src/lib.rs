//! # Tidewatch Channels
//! Delivery channel implementations.

pub mod discord;

pub use discord::{DiscordChannel, DiscordChannelConfig};
