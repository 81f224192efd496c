//! Float pipeline scenarios: genuine float with special values, pseudo-float
//! demotion, and byte-exact reconstruction of the source words.

use libvelox::codec::format;
use libvelox::{encode_block, FloatMode, StreamingDecoder};

/// encode float32 words, decode, rebuild the words
fn roundtrip_bytes(buf: &[u8]) -> Vec<u8> {
    let (mantissas, exponents) = format::split_float32(buf);
    let payload = encode_block(&mantissas, true, &exponents);

    let total = mantissas.len() as u64;
    let mut dec = StreamingDecoder::new(&payload, total).unwrap();
    assert!(dec.is_float());

    let mode = dec.float_mode();
    let mut samples = Vec::new();
    let mut exps = Vec::new();
    while let Some((s, e)) = dec.decode_next().unwrap() {
        samples.push(s);
        exps.push(e);
    }

    let mut back = Vec::new();
    match mode {
        FloatMode::Genuine => format::merge_float32(&samples, &exps, &mut back),
        m => format::promote_to_bytes(&samples, m, &mut back),
    }
    back
}

fn words_of(floats: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(floats.len() * 4);
    for f in floats {
        buf.extend_from_slice(&f.to_le_bytes());
    }
    buf
}

#[test]
fn test_pseudo_float_16_stereo() {
    // 2048 stereo frames of 16-bit-representable values
    let floats: Vec<f32> = [-0.5f32, 0.25, 0.125, 0.75]
        .iter()
        .cycle()
        .take(4096)
        .copied()
        .collect();
    let buf = words_of(&floats);

    let (m, e) = format::split_float32(&buf);
    let payload = encode_block(&m, true, &e);
    let dec = StreamingDecoder::new(&payload, m.len() as u64).unwrap();
    assert_eq!(dec.float_mode(), FloatMode::Pseudo16);

    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_pseudo_float_24() {
    let floats: Vec<f32> = (0..2000)
        .map(|i| ((i * 997) % 100_000) as f32 / 8_388_608.0)
        .collect();
    let buf = words_of(&floats);

    let (m, e) = format::split_float32(&buf);
    let payload = encode_block(&m, true, &e);
    let dec = StreamingDecoder::new(&payload, m.len() as u64).unwrap();
    assert_eq!(dec.float_mode(), FloatMode::Pseudo24);

    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_genuine_float_with_special_values() {
    // 1024 samples including NaN, +infinity and a subnormal
    let mut floats: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.013).sin() * 0.8).collect();
    floats[100] = f32::NAN;
    floats[200] = f32::INFINITY;
    floats[300] = 1e-42;
    let buf = words_of(&floats);

    let (m, e) = format::split_float32(&buf);
    let payload = encode_block(&m, true, &e);
    let dec = StreamingDecoder::new(&payload, m.len() as u64).unwrap();
    assert_eq!(dec.float_mode(), FloatMode::Genuine);
    assert!(!dec.high_res(), "genuine float never uses the high-res split");

    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_nan_payload_preserved_bitwise() {
    let mut buf = words_of(&[0.5f32; 256]);
    // a NaN with a distinctive payload, not the canonical quiet NaN
    buf[4..8].copy_from_slice(&0x7FC1_2345u32.to_le_bytes());
    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_negative_zero_roundtrip() {
    let floats: Vec<f32> = (0..512)
        .map(|i| if i % 17 == 0 { -0.0 } else { 0.25 })
        .collect();
    let buf = words_of(&floats);
    // -0.0 must push the stream to genuine float, or its sign bit would die
    let (m, e) = format::split_float32(&buf);
    assert_eq!(format::pseudo_float_mode(&m, &e), FloatMode::Genuine);
    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_exponent_stream_constant_signal() {
    // long runs of one exponent exercise the saturating RLE splits
    let floats = vec![0.37f32; 3000];
    let buf = words_of(&floats);
    assert_eq!(roundtrip_bytes(&buf), buf);
}

#[test]
fn test_genuine_float_noise() {
    // mantissa noise lands in the verbatim fallback and still reconstructs
    let floats: Vec<f32> = (0..4096)
        .map(|i| {
            let x = ((i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40) as u32;
            (x as f32 / (1u32 << 24) as f32) * 1.9 - 0.95
        })
        .collect();
    let buf = words_of(&floats);
    assert_eq!(roundtrip_bytes(&buf), buf);
}
