//! UseCase layer of the relay server.

mod error;
mod relay_message;

pub use error::RelayError;
pub use relay_message::RelayMessageUseCase;
