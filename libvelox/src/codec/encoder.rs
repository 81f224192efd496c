//! Block engine: turns one block of interleaved samples into the compressed
//! payload bitstream.
//!
//! Sub-blocks are pure functions of their samples and the block flags, so
//! they are encoded on the rayon pool and gathered in deterministic order;
//! the output bytes do not depend on the worker count.

use log::debug;
use rayon::prelude::*;

use crate::codec::{channel, format, lpc::LpcModel, lms::SignLms, shaping};
use crate::core::bits::BitWriter;
use crate::core::rice::{self, RiceContext};
use crate::core::types::{FloatMode, Sample, HIGH_RES_LIMIT, SUBBLOCK_SAMPLES};

/// Encode one block of interleaved samples into a self-contained compressed
/// payload.
///
/// For float input, `samples` holds the signed mantissas and `exponents` the
/// parallel biased-exponent stream from the format front-end; `exponents` is
/// ignored for integer input. Samples are treated as pairs when the total
/// count is even and as a single stream otherwise, which is exactly the rule
/// the streaming decoder derives from the sample count.
pub fn encode_block(samples: &[Sample], is_float: bool, exponents: &[u8]) -> Vec<u8> {
    let mut bw = BitWriter::with_capacity(samples.len());

    bw.write_bit(is_float as u32);

    let mut float_mode = FloatMode::Genuine;
    let work: Vec<Sample>;
    if is_float {
        assert_eq!(samples.len(), exponents.len());
        float_mode = format::pseudo_float_mode(samples, exponents);
        bw.write_bits(float_mode as u32, 2);
        if float_mode == FloatMode::Genuine {
            shaping::encode_rle(exponents, &mut bw);
            work = samples.to_vec();
        } else {
            debug!("pseudo-float input, demoting at 1/{}", float_mode.scale());
            work = format::demote_floats(samples, exponents, float_mode);
        }
    } else {
        work = samples.to_vec();
    }

    let genuine_float = is_float && float_mode == FloatMode::Genuine;
    let high_res = !genuine_float && work.iter().any(|&x| x.abs() > HIGH_RES_LIMIT);
    bw.write_bit(high_res as u32);

    let chunks: Vec<Vec<u8>> = if work.len() % 2 == 0 {
        work.par_chunks(SUBBLOCK_SAMPLES)
            .map(|sub| encode_stereo_subblock(sub, high_res))
            .collect()
    } else {
        vec![encode_mono_subblock(&work, high_res)]
    };

    for chunk in &chunks {
        bw.write_bits(chunk.len() as u32, 32);
        for &b in chunk {
            bw.write_bits(b as u32, 8);
        }
    }

    bw.into_bytes()
}

fn encode_stereo_subblock(sub: &[Sample], high_res: bool) -> Vec<u8> {
    let (left, right) = channel::deinterleave(sub);
    let frames = left.len();

    let use_ms = channel::prefer_mid_side(&left, &right);
    let (mut a, mut b) = (left.clone(), right.clone());
    if use_ms {
        channel::to_mid_side(&mut a, &mut b);
    }

    let mut cw = BitWriter::new();
    cw.write_bit(1); // compressed_mode
    cw.write_bit(use_ms as u32);
    let mut fits = encode_stream(&mut cw, a, high_res);
    fits &= encode_stream(&mut cw, b, high_res);
    let compressed = cw.into_bytes();

    // raw 32-bit ZigZag dump size; anything not beating it gets dumped
    let threshold = frames * 2 * 4;
    if fits && compressed.len() < threshold {
        return compressed;
    }

    debug!(
        "verbatim fallback for {}-frame sub-block ({} >= {})",
        frames,
        compressed.len(),
        threshold
    );
    let mut vw = BitWriter::with_capacity(threshold + 1);
    vw.write_bit(0); // compressed_mode
    vw.write_bit(0); // verbatim never transforms
    for &x in &left {
        vw.write_bits(rice::zigzag(x) as u32, 32);
    }
    for &x in &right {
        vw.write_bits(rice::zigzag(x) as u32, 32);
    }
    vw.into_bytes()
}

fn encode_mono_subblock(sub: &[Sample], high_res: bool) -> Vec<u8> {
    let mut cw = BitWriter::new();
    cw.write_bit(1);
    let fits = encode_stream(&mut cw, sub.to_vec(), high_res);
    let compressed = cw.into_bytes();

    let threshold = sub.len() * 4;
    if fits && compressed.len() < threshold {
        return compressed;
    }

    let mut vw = BitWriter::with_capacity(threshold + 1);
    vw.write_bit(0);
    for &x in sub {
        vw.write_bits(rice::zigzag(x) as u32, 32);
    }
    vw.into_bytes()
}

/// Encode one channel stream: silence bit, then LSB shift, LPC header and
/// the Rice-coded LMS-corrected residuals; the low-byte tail follows in
/// high-res mode. Returns false when a residual overflowed the 32-bit
/// escape, which forces the caller onto the verbatim path.
fn encode_stream(cw: &mut BitWriter, mut stream: Vec<Sample>, high_res: bool) -> bool {
    let lows = if high_res {
        shaping::split_low_bytes(&mut stream)
    } else {
        Vec::new()
    };

    let silent = shaping::is_silent(&stream);
    cw.write_bit(silent as u32);

    let mut fits = true;
    if !silent {
        let shift = shaping::lsb_shift_of(&stream);
        shaping::apply_shift(&mut stream, shift);
        cw.write_bits(shift, 5);

        let model = LpcModel::analyze(&stream);
        model.write_to(cw);

        let mut lms = SignLms::new();
        let mut ctx = RiceContext::new();
        for i in 0..stream.len() {
            let res_lpc = stream[i] - model.predict(&stream, i);
            let pred_lms = lms.predict();
            fits &= rice::encode_residual(cw, res_lpc - pred_lms, &mut ctx);
            lms.update(res_lpc, pred_lms);
        }
    }

    for &b in &lows {
        cw.write_bits(b as u32, 8);
    }

    fits
}
