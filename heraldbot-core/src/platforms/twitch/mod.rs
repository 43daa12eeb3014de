// File: src/platforms/twitch/mod.rs

pub mod auth;
pub mod client;
pub mod probe;
pub mod requests;

pub use client::TwitchHelixClient;
pub use probe::{LiveStreamMeta, StreamSnapshot};
