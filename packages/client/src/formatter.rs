//! Message formatting utilities for the diagnostic log.

use testsock_shared::ChatMessage;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a received chat message as one log line
    ///
    /// # Returns
    ///
    /// `"<name>'s message: <str>"`
    pub fn format_chat_message(msg: &ChatMessage) -> String {
        format!("{}'s message: {}", msg.name, msg.body)
    }

    /// Format the banner shown once the connection is open
    pub fn format_connected_banner(name: &str, url: &str) -> String {
        format!(
            "\nConnected to {}. You are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
            url, name
        )
    }
}
