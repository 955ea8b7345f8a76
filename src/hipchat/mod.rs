//! All HipChat-specific functionality

pub mod client;
pub mod descriptor;
pub mod response_builder;

pub use client::{HipChatClient, Messenger};
