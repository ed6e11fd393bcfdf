//! Infrastructure layer: concrete implementations of domain traits.

pub mod message_pusher;
