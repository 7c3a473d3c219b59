//! Multi-client TCP chat relay.
//!
//! Peers connect, declare a display name, and every message they send is
//! rebroadcast to all other connected peers.

pub mod domain;
pub mod infrastructure;
pub mod relay;
pub mod ui;

pub use infrastructure::Registry;
pub use relay::RelayServer;
