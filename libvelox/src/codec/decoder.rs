//! Chunk decoder: the exact inverse of one sub-block encode.

use crate::codec::{channel, lpc::LpcModel, lms::SignLms, shaping};
use crate::core::bits::BitReader;
use crate::core::rice::{self, RiceContext};
use crate::core::types::{Sample, VeloxError, VeloxResult};

/// Decode one chunk body into `out` (interleaved for the pair case).
///
/// `frames` is the per-stream sample count implied by the partition rule;
/// chunks carry no explicit count of their own.
pub fn decode_chunk(
    body: &[u8],
    frames: usize,
    stereo: bool,
    high_res: bool,
    out: &mut Vec<Sample>,
) -> VeloxResult<()> {
    let mut br = BitReader::new(body);
    let compressed = br.read_bit() == 1;
    let use_ms = if stereo { br.read_bit() == 1 } else { false };

    if compressed {
        let mut first = decode_stream(&mut br, frames, high_res);
        if stereo {
            let mut second = decode_stream(&mut br, frames, high_res);
            if use_ms {
                channel::from_mid_side(&mut first, &mut second);
            }
            channel::interleave(&first, &second, out);
        } else {
            out.append(&mut first);
        }
    } else {
        let streams = if stereo { 2 } else { 1 };
        let body_bits = 1 + (stereo as usize) + streams * frames * 32;
        if body.len() != body_bits.div_ceil(8) {
            return Err(VeloxError::CorruptChunk("verbatim body has the wrong size"));
        }

        let mut first = read_verbatim(&mut br, frames);
        if stereo {
            let mut second = read_verbatim(&mut br, frames);
            // the bit is authoritative even here, though the encoder never
            // transforms a verbatim sub-block
            if use_ms {
                channel::from_mid_side(&mut first, &mut second);
            }
            channel::interleave(&first, &second, out);
        } else {
            out.append(&mut first);
        }
    }

    Ok(())
}

fn decode_stream(br: &mut BitReader, frames: usize, high_res: bool) -> Vec<Sample> {
    let silent = br.read_bit() == 1;

    let mut stream;
    if silent {
        stream = vec![0; frames];
    } else {
        let shift = br.read_bits(5);
        let model = LpcModel::read_from(br);

        let mut lms = SignLms::new();
        let mut ctx = RiceContext::new();
        stream = Vec::with_capacity(frames);
        for i in 0..frames {
            let final_res = rice::decode_residual(br, &mut ctx);
            let pred_lms = lms.predict();
            let res_lpc = final_res + pred_lms;
            lms.update(res_lpc, pred_lms);
            let x = res_lpc + model.predict(&stream, i);
            stream.push(x);
        }
        shaping::restore_shift(&mut stream, shift);
    }

    if high_res {
        let lows: Vec<u8> = (0..frames).map(|_| br.read_bits(8) as u8).collect();
        shaping::merge_low_bytes(&mut stream, &lows);
    }

    stream
}

fn read_verbatim(br: &mut BitReader, frames: usize) -> Vec<Sample> {
    (0..frames)
        .map(|_| rice::dezigzag(br.read_bits(32) as u64))
        .collect()
}
