//! Streaming pull decoder over the compressed payload of one file.
//!
//! Strictly sequential: chunks are consumed in order and samples come out
//! one at a time. The decoder holds no external resources; dropping it is
//! the only cancellation there is.

use log::trace;

use crate::codec::decoder::decode_chunk;
use crate::codec::shaping;
use crate::core::bits::BitReader;
use crate::core::types::{
    FloatMode, Sample, VeloxError, VeloxResult, FRAMES_PER_SUBBLOCK,
};

pub struct StreamingDecoder<'a> {
    reader: BitReader<'a>,
    /// reader state right after the block header bits, for [`reset`]
    after_header: BitReader<'a>,
    total_samples: u64,
    decoded: u64,

    is_float: bool,
    float_mode: FloatMode,
    high_res: bool,

    /// eagerly decoded exponent stream (genuine float only)
    exponents: Vec<u8>,
    exp_pos: usize,

    scratch: Vec<Sample>,
    cursor: usize,
}

impl<'a> StreamingDecoder<'a> {
    /// Parse the block header bits and set up over the payload.
    pub fn new(payload: &'a [u8], total_samples: u64) -> VeloxResult<Self> {
        let mut reader = BitReader::new(payload);

        let is_float = reader.read_bit() == 1;
        let mut float_mode = FloatMode::Genuine;
        let mut exponents = Vec::new();
        if is_float {
            float_mode = FloatMode::from(reader.read_bits(2));
            if float_mode == FloatMode::Genuine {
                exponents = shaping::decode_rle(&mut reader, total_samples as usize)?;
            }
        }
        let high_res = reader.read_bit() == 1;

        Ok(StreamingDecoder {
            after_header: reader.clone(),
            reader,
            total_samples,
            decoded: 0,
            is_float,
            float_mode,
            high_res,
            exponents,
            exp_pos: 0,
            scratch: Vec::new(),
            cursor: 0,
        })
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn float_mode(&self) -> FloatMode {
        self.float_mode
    }

    pub fn high_res(&self) -> bool {
        self.high_res
    }

    /// samples handed out so far
    pub fn position(&self) -> u64 {
        self.decoded
    }

    /// Next sample together with its exponent byte (zero unless genuine
    /// float); `None` once the declared total has been produced.
    pub fn decode_next(&mut self) -> VeloxResult<Option<(Sample, u8)>> {
        if self.decoded >= self.total_samples {
            return Ok(None);
        }
        if self.cursor >= self.scratch.len() {
            self.load_next_chunk()?;
        }

        let sample = self.scratch[self.cursor];
        self.cursor += 1;

        let exp = if self.is_float && self.float_mode == FloatMode::Genuine {
            let e = self.exponents[self.exp_pos];
            self.exp_pos += 1;
            e
        } else {
            0
        };

        self.decoded += 1;
        Ok(Some((sample, exp)))
    }

    /// Rewind to the first sample; the payload is not re-parsed.
    pub fn reset(&mut self) {
        self.reader = self.after_header.clone();
        self.decoded = 0;
        self.exp_pos = 0;
        self.scratch.clear();
        self.cursor = 0;
    }

    fn load_next_chunk(&mut self) -> VeloxResult<()> {
        let remaining = (self.total_samples - self.decoded) as usize;
        let stereo = self.total_samples % 2 == 0;
        let frames = if stereo {
            FRAMES_PER_SUBBLOCK.min(remaining / 2)
        } else {
            remaining
        };

        if self.reader.remaining_bits() < 32 {
            return Err(VeloxError::TruncatedStream);
        }
        let chunk_len = self.reader.read_bits(32) as usize;
        if chunk_len * 8 > self.reader.remaining_bits() {
            return Err(VeloxError::CorruptChunk("chunk length overruns the payload"));
        }

        let mut body = vec![0u8; chunk_len];
        for b in body.iter_mut() {
            *b = self.reader.read_bits(8) as u8;
        }

        trace!("chunk: {} bytes, {} frames", chunk_len, frames);

        self.scratch.clear();
        decode_chunk(&body, frames, stereo, self.high_res, &mut self.scratch)?;
        self.cursor = 0;
        Ok(())
    }
}
