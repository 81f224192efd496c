//! Property-based tests for bit I/O, ZigZag and the format front-end.

use proptest::prelude::*;

use libvelox::codec::format;
use libvelox::core::bits::{BitReader, BitWriter};
use libvelox::core::rice::{dezigzag, zigzag};
use libvelox::Sample;

proptest! {
    /// any (value, width) pair written then read comes back unchanged
    #[test]
    fn roundtrip_bits_variable_width(value in any::<u32>(), width in 1u32..=32) {
        let masked = if width == 32 { value } else { value & ((1 << width) - 1) };

        let mut w = BitWriter::new();
        w.write_bits(masked, width);
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        prop_assert_eq!(r.read_bits(width), masked);
    }

    /// sequences of mixed-width writes read back in order
    #[test]
    fn roundtrip_bit_sequences(values in prop::collection::vec((any::<u32>(), 1u32..=32), 1..64)) {
        let mut w = BitWriter::new();
        for &(v, n) in &values {
            w.write_bits(v, n);
        }
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        for &(v, n) in &values {
            let masked = if n == 32 { v } else { v & ((1 << n) - 1) };
            prop_assert_eq!(r.read_bits(n), masked);
        }
    }

    /// individual bits round-trip
    #[test]
    fn roundtrip_individual_bits(bits in prop::collection::vec(any::<bool>(), 1..200)) {
        let mut w = BitWriter::new();
        for &b in &bits {
            w.write_bit(b as u32);
        }
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        for (i, &b) in bits.iter().enumerate() {
            prop_assert_eq!(r.read_bit(), b as u32, "mismatch at bit {}", i);
        }
    }

    /// signed reads sign-extend correctly for every width
    #[test]
    fn roundtrip_signed(value in any::<i32>(), width in 1u32..=32) {
        let wrapped = (value << (32 - width)) >> (32 - width);

        let mut w = BitWriter::new();
        w.write_bits(wrapped as u32, width);
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        prop_assert_eq!(r.read_bits_signed(width), wrapped);
    }

    /// ZigZag is a bijection on i64
    #[test]
    fn roundtrip_zigzag(value in any::<Sample>()) {
        prop_assert_eq!(dezigzag(zigzag(value)), value);
    }

    /// small magnitudes map to small codes
    #[test]
    fn zigzag_orders_by_magnitude(value in -1000i64..=1000) {
        prop_assert!(zigzag(value) <= 2 * value.unsigned_abs() as u64);
    }

    /// 16-bit PCM pack/unpack round-trips
    #[test]
    fn roundtrip_pcm16(samples in prop::collection::vec(any::<i16>(), 0..512)) {
        let wide: Vec<Sample> = samples.iter().map(|&s| s as Sample).collect();
        let mut bytes = Vec::new();
        format::samples_to_bytes(&wide, 16, &mut bytes);
        prop_assert_eq!(format::bytes_to_samples(&bytes, 16).unwrap(), wide);
    }

    /// 24-bit PCM pack/unpack round-trips
    #[test]
    fn roundtrip_pcm24(samples in prop::collection::vec(-(1i64 << 23)..(1i64 << 23), 0..512)) {
        let mut bytes = Vec::new();
        format::samples_to_bytes(&samples, 24, &mut bytes);
        prop_assert_eq!(format::bytes_to_samples(&bytes, 24).unwrap(), samples);
    }

    /// 32-bit PCM pack/unpack round-trips
    #[test]
    fn roundtrip_pcm32(samples in prop::collection::vec(any::<i32>(), 0..512)) {
        let wide: Vec<Sample> = samples.iter().map(|&s| s as Sample).collect();
        let mut bytes = Vec::new();
        format::samples_to_bytes(&wide, 32, &mut bytes);
        prop_assert_eq!(format::bytes_to_samples(&bytes, 32).unwrap(), wide);
    }

    /// the float split/merge is bit-exact for arbitrary 32-bit words,
    /// NaN payloads and all
    #[test]
    fn roundtrip_float_split(words in prop::collection::vec(any::<u32>(), 0..512)) {
        let mut buf = Vec::new();
        for w in &words {
            buf.extend_from_slice(&w.to_le_bytes());
        }
        let (mantissas, exponents) = format::split_float32(&buf);
        let mut back = Vec::new();
        format::merge_float32(&mantissas, &exponents, &mut back);
        prop_assert_eq!(buf, back);
    }
}
