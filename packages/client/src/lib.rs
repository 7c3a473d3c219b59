//! Command-line client for the chat relay.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use domain::{ClientEvent, InputCommand};
pub use error::ClientError;
pub use runner::{SendOutcome, run_client, send_input};
pub use session::ClientSession;
