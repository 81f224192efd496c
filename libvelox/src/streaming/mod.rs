//! streaming decode over a compressed payload

mod decoder;

pub use decoder::StreamingDecoder;
