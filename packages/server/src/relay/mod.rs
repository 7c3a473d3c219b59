//! Accepting peers and moving bytes between sockets and the registry.

pub mod handshake;
pub mod reader;
pub mod server;
pub mod signal;
pub mod writer;

pub use handshake::perform_handshake;
pub use reader::{CloseReason, ReaderTask};
pub use server::RelayServer;
pub use signal::shutdown_signal;
pub use writer::run_writer;
