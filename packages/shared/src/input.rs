//! Line input for the interactive consoles.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

/// Read lines on a dedicated thread and forward them to the async side.
///
/// rustyline blocks, so it gets its own OS thread. Lines are trimmed; blank
/// lines are skipped. The channel closes on end of input (Ctrl+D), Ctrl+C or
/// a terminal error, which the consoles treat as a request to quit.
pub fn spawn_line_reader(prompt: impl Into<String>) -> mpsc::UnboundedReceiver<String> {
    let prompt = prompt.into();
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::debug!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::debug!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
