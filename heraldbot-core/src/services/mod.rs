// File: src/services/mod.rs

pub mod command_service;
pub mod message_sender;

pub use command_service::CommandService;
pub use message_sender::OutboundMessenger;
