//! core building blocks: types, bit I/O, entropy coding, metadata

pub mod bits;
pub mod metadata;
pub mod rice;
pub mod types;

pub use bits::{BitReader, BitWriter};
pub use metadata::{Picture, VeloxMetadata};
pub use types::{
    FloatMode, Header, Sample, VeloxError, VeloxResult, FORMAT_FLOAT, FORMAT_PCM,
    FRAMES_PER_SUBBLOCK, HEADER_SIZE, HIGH_RES_LIMIT, MAGIC, MAX_SUPPORTED_MAJOR,
    METADATA_MIN_VERSION, SUBBLOCK_SAMPLES, VENDOR, VERSION,
};
