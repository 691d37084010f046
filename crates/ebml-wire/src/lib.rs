#![warn(clippy::pedantic)]

pub mod element;
pub mod error;
pub mod identifier;
pub mod value;
pub mod vint;

pub use element::ElementHeader;
pub use error::WireError;
pub use identifier::Identifier;
