//! # libvelox
//!
//! Lossless audio codec for integer and IEEE-754 float PCM. The compressed
//! stream is built from independently decodable sub-block chunks (LPC plus an
//! adaptive sign-LMS residual predictor under adaptive Rice coding), wrapped
//! in an envelope that preserves the source container's header and trailing
//! bytes so a decode reproduces the original file exactly.
//!
//! The two core entry points are [`encode_block`] for the whole compressed
//! payload of a file and [`StreamingDecoder`] to pull samples back out one at
//! a time. [`Reader`] and [`Writer`] handle the file envelope around that
//! payload, [`VeloxMetadata`] the tag block between them.

pub mod codec;
pub mod core;
pub mod streaming;

mod reader;
mod writer;

pub use crate::core::{
    FloatMode, Header, Picture, Sample, VeloxError, VeloxMetadata, VeloxResult, FORMAT_FLOAT,
    FORMAT_PCM, MAGIC, VENDOR, VERSION,
};
pub use codec::encode_block;
pub use reader::{Reader, VeloxFile};
pub use streaming::StreamingDecoder;
pub use writer::Writer;

/// library format version as "major.minor"
pub fn version() -> String {
    format!("{}.{}", VERSION >> 8, VERSION & 0xFF)
}
