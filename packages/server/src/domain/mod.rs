//! Domain layer of the relay server.

mod pusher;
mod session;

pub use pusher::{MessagePushError, MessagePusher, PusherChannel};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use session::SessionId;
