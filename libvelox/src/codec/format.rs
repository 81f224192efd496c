//! Format front-end: integer PCM packing, IEEE-754 float32 split/merge and
//! pseudo-float detection.
//!
//! Float samples are carried as a signed mantissa (hidden bit applied for
//! normal numbers) plus the verbatim 8-bit biased exponent. The split is
//! lossless for every finite value, zero, subnormals, infinities and NaNs.

use crate::core::types::{FloatMode, Sample, VeloxError, VeloxResult};

/// decode little-endian 16/24/32-bit signed PCM into samples
pub fn bytes_to_samples(buf: &[u8], bits: u16) -> VeloxResult<Vec<Sample>> {
    let width = match bits {
        16 => 2,
        24 => 3,
        32 => 4,
        _ => return Err(VeloxError::CorruptChunk("unsupported PCM bit depth")),
    };
    let count = buf.len() / width;
    let mut out = Vec::with_capacity(count);

    for chunk in buf.chunks_exact(width) {
        let v: Sample = match bits {
            16 => i16::from_le_bytes([chunk[0], chunk[1]]) as Sample,
            24 => {
                let mut u =
                    (chunk[0] as u32) | ((chunk[1] as u32) << 8) | ((chunk[2] as u32) << 16);
                if u & 0x80_0000 != 0 {
                    u |= 0xFF00_0000;
                }
                u as i32 as Sample
            }
            _ => i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as Sample,
        };
        out.push(v);
    }

    Ok(out)
}

/// exact inverse of [`bytes_to_samples`]
pub fn samples_to_bytes(samples: &[Sample], bits: u16, out: &mut Vec<u8>) {
    for &s in samples {
        match bits {
            16 => out.extend_from_slice(&(s as i16).to_le_bytes()),
            24 => {
                let v = s as i32;
                out.push((v & 0xFF) as u8);
                out.push(((v >> 8) & 0xFF) as u8);
                out.push(((v >> 16) & 0xFF) as u8);
            }
            _ => out.extend_from_slice(&(s as i32).to_le_bytes()),
        }
    }
}

/// split raw float32 words into (signed mantissas, biased exponents)
pub fn split_float32(buf: &[u8]) -> (Vec<Sample>, Vec<u8>) {
    let count = buf.len() / 4;
    let mut mantissas = Vec::with_capacity(count);
    let mut exponents = Vec::with_capacity(count);

    for chunk in buf.chunks_exact(4) {
        let u = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let sign = u >> 31;
        let exp = ((u >> 23) & 0xFF) as u8;
        let mut mant = u & 0x7F_FFFF;

        // hidden bit for normal numbers
        if exp != 0 {
            mant |= 0x80_0000;
        }

        exponents.push(exp);
        mantissas.push(if sign != 0 {
            -(mant as Sample)
        } else {
            mant as Sample
        });
    }

    (mantissas, exponents)
}

/// recompose float32 words from (signed mantissas, biased exponents)
pub fn merge_float32(mantissas: &[Sample], exponents: &[u8], out: &mut Vec<u8>) {
    for (&m, &exp) in mantissas.iter().zip(exponents.iter()) {
        out.extend_from_slice(&recompose_bits(m, exp).to_le_bytes());
    }
}

#[inline]
fn recompose_bits(mantissa: Sample, exp: u8) -> u32 {
    let sign = if mantissa < 0 { 1u32 } else { 0 };
    let mant = (mantissa.unsigned_abs() as u32) & 0x7F_FFFF;
    (sign << 31) | ((exp as u32) << 23) | mant
}

#[inline]
fn recompose_f32(mantissa: Sample, exp: u8) -> f32 {
    f32::from_bits(recompose_bits(mantissa, exp))
}

/// Classify a float stream: pseudo-16 if every sample is exactly a 16-bit
/// integer scaled by 1/32768, pseudo-24 at 1/8388608, genuine float
/// otherwise.
///
/// Positive zero is skipped. Negative zero, NaN and infinities force genuine
/// float: the demote/promote integer path cannot reproduce their bit
/// patterns, and the payload round trip is absolute.
pub fn pseudo_float_mode(mantissas: &[Sample], exponents: &[u8]) -> FloatMode {
    let mut fits16 = true;
    let mut fits24 = true;

    for (&m, &exp) in mantissas.iter().zip(exponents.iter()) {
        let f = recompose_f32(m, exp);
        if !f.is_finite() || (f == 0.0 && f.is_sign_negative()) {
            return FloatMode::Genuine;
        }
        if f == 0.0 {
            continue;
        }
        if fits16 && !fits_mode(f, FloatMode::Pseudo16) {
            fits16 = false;
        }
        if !fits16 && !fits_mode(f, FloatMode::Pseudo24) {
            fits24 = false;
            break;
        }
    }

    if fits16 {
        FloatMode::Pseudo16
    } else if fits24 {
        FloatMode::Pseudo24
    } else {
        FloatMode::Genuine
    }
}

/// the scaled integer must reconvert exactly AND land in the integer range
/// the mode names (16 or 24 bits), or demotion would overflow
#[inline]
fn fits_mode(f: f32, mode: FloatMode) -> bool {
    let scale = mode.scale();
    let r = (f as f64 * scale).round();
    r >= -scale && r < scale && (r / scale) as f32 == f
}

/// demote a pseudo-float stream to scaled integers
pub fn demote_floats(mantissas: &[Sample], exponents: &[u8], mode: FloatMode) -> Vec<Sample> {
    let scale = mode.scale();
    mantissas
        .iter()
        .zip(exponents.iter())
        .map(|(&m, &exp)| (recompose_f32(m, exp) as f64 * scale).round() as Sample)
        .collect()
}

/// promote demoted integers back to float32 words
pub fn promote_to_bytes(samples: &[Sample], mode: FloatMode, out: &mut Vec<u8>) {
    let scale = mode.scale();
    for &s in samples {
        let f = (s as f64 / scale) as f32;
        out.extend_from_slice(&f.to_le_bytes());
    }
}
