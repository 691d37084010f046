#![warn(clippy::pedantic)]

pub mod callback;
pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod streaming;

mod node;
mod pending;

pub use callback::DecoderCallback;
pub use config::DecoderConfig;
pub use decoder::StreamDecoder;
pub use ebml_wire::Identifier;
pub use error::DecodeError;
pub use events::{DecoderEvent, EventCollector};
