//! Interactive prompt: every line typed is sent as one chat message.

use std::{io::Write, sync::Arc, time::Duration};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    connection::SocketTestClient,
    formatter::MessageFormatter,
    handler::MessageLog,
};

/// How long the prompt waits for the connection before accepting input anyway.
const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Redisplay the prompt after printing a message
pub fn redisplay_prompt(name: &str) {
    print!("{}> ", name);
    std::io::stdout().flush().ok();
}

/// Prints received messages above the prompt.
///
/// The line goes to stdout only; the fmt layer writes to stdout as well, so
/// mirroring it to tracing would show every message twice.
pub struct PromptMessageLog {
    name: String,
}

impl PromptMessageLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MessageLog for PromptMessageLog {
    fn record(&self, line: &str) {
        print!("\n{}\n", line);
        redisplay_prompt(&self.name);
    }
}

/// Run the interactive session until stdin ends or Ctrl+C.
pub async fn run_prompt(
    client: &SocketTestClient,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = client.log_messages(Arc::new(PromptMessageLog::new(name)));

    match tokio::time::timeout(OPEN_TIMEOUT, client.wait_open()).await {
        Ok(Ok(())) => {
            println!(
                "{}",
                MessageFormatter::format_connected_banner(name, client.url())
            );
        }
        Ok(Err(e)) => {
            listener.abort();
            return Err(Box::new(e));
        }
        Err(_) => {
            tracing::warn!(
                "Connection is not open after {:?}; messages typed now are dropped",
                OPEN_TIMEOUT
            );
        }
    }

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", name);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            line = input_rx.recv() => match line {
                Some(line) => client.send(name, &line),
                None => break,
            },
            _ = client.wait_closed() => {
                tracing::info!("Connection closed");
                break;
            }
        }
    }

    client.close();
    listener.abort();
    Ok(())
}
