//! Shared building blocks for the chat relay server and client.
//!
//! Both binaries use the same wire protocol, configuration defaults, logger
//! setup, line input and clock utilities, so they live here.

pub mod config;
pub mod input;
pub mod logger;
pub mod protocol;
pub mod time;
