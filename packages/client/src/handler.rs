//! Inbound message handling: decode, format, write to the diagnostic log.

use testsock_shared::{ChatMessage, CodecError};

use crate::formatter::MessageFormatter;

/// Destination of diagnostic lines (the browser console, in spirit).
#[cfg_attr(test, mockall::automock)]
pub trait MessageLog: Send + Sync {
    fn record(&self, line: &str);
}

/// Tracing target of received chat lines. It sits under the crate target so
/// the default logger filter lets it through.
pub const CONSOLE_TARGET: &str = "testsock_client::console";

/// Writes diagnostic lines as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMessageLog;

impl MessageLog for TracingMessageLog {
    fn record(&self, line: &str) {
        tracing::info!(target: CONSOLE_TARGET, "{}", line);
    }
}

/// Default message handler.
///
/// Decodes one inbound payload and records exactly one formatted line. A
/// payload that is not a chat message records nothing and returns the
/// decode error to the caller.
pub fn log_chat_frame(log: &dyn MessageLog, text: &str) -> Result<ChatMessage, CodecError> {
    let msg = ChatMessage::decode(text)?;
    log.record(&MessageFormatter::format_chat_message(&msg));
    Ok(msg)
}
