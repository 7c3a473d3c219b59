//! Operator console for the relay server.

pub mod console;

pub use console::{
    ConsoleCommand, format_transcript_line, format_user_list, print_transcript, run_console,
};
