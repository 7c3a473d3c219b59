//! Client execution logic.

use chat_relay_shared::{config::ClientConfig, input::spawn_line_reader, time::get_timestamp};

use crate::{
    domain::{ClientEvent, InputCommand, parse_input},
    formatter::MessageFormatter,
    session::ClientSession,
    ui::{prompt, redisplay_prompt},
};

/// What became of one line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Sent; holds the echo line for the user's own message
    Sent(String),
    /// The write failed; holds the system line explaining it
    Failed(String),
}

/// Send `text` and build the line to show for it, timestamped at `at`.
pub async fn send_input(
    session: &mut ClientSession,
    formatter: &MessageFormatter,
    text: &str,
    at: i64,
) -> SendOutcome {
    match session.send(text).await {
        Ok(()) => SendOutcome::Sent(formatter.format_own(text, at)),
        Err(e) => {
            tracing::warn!("{}", e);
            SendOutcome::Failed(
                formatter.format_system(&format!("Failed to send message: {}", e), at),
            )
        }
    }
}

/// Run the interactive client until `/quit`, end of input or disconnection.
///
/// Connection failures are returned, never retried. A failed send ends the
/// session like a disconnect.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = MessageFormatter::local();

    println!("Connecting to server at {}...", config.server_address());
    let (mut session, mut events) = ClientSession::connect(&config).await?;
    let name = session.name().to_string();

    println!(
        "{}",
        formatter.format_system(
            &format!("Connected to server at {}", config.server_address()),
            get_timestamp()
        )
    );
    println!("\nConnected as {}. Start typing messages!", name);
    println!("Type '/quit' to disconnect.\n");

    let mut input_rx = spawn_line_reader(prompt(&name));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::Received(payload)) => {
                    println!("\r{}", formatter.format_payload(&payload, get_timestamp()));
                    redisplay_prompt(&name);
                }
                Some(ClientEvent::Disconnected) | None => {
                    println!(
                        "\r{}",
                        formatter.format_system("Disconnected from server", get_timestamp())
                    );
                    break;
                }
            },
            line = input_rx.recv() => match line.map(|line| parse_input(&line)) {
                Some(InputCommand::Send(text)) => {
                    match send_input(&mut session, &formatter, &text, get_timestamp()).await {
                        SendOutcome::Sent(line) => println!("{}", line),
                        SendOutcome::Failed(line) => {
                            println!("{}", line);
                            break;
                        }
                    }
                }
                Some(InputCommand::Ignore) => {}
                Some(InputCommand::Quit) | None => {
                    println!(
                        "{}",
                        formatter.format_system("Disconnecting from server...", get_timestamp())
                    );
                    if let Err(e) = session.close().await {
                        tracing::warn!("{}", e);
                    }
                    break;
                }
            },
        }
    }

    println!("Disconnected.");
    Ok(())
}
