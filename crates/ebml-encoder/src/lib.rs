#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;

pub use encoder::EbmlEncoder;
pub use error::EncodeError;
