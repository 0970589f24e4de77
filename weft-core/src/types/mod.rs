//! Type definitions shared across the Weft crates

pub mod message;
pub mod request;
pub mod stream;
pub mod tool;
