//! WAV/AIFF container scanning.
//!
//! The codec preserves the source container byte-for-byte, so this scanner
//! does not decode anything: it locates the audio payload and reports the
//! exact byte ranges of everything before and after it, including the pad
//! byte WAV and AIFF insert after odd-sized chunks.

use anyhow::{bail, Result};

/// where the audio lives inside a source container
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub format_code: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub channels: u16,
    /// AIFF payloads are big-endian on disk
    pub big_endian: bool,
    pub data_pos: usize,
    pub data_size: usize,
    /// a pad byte sits between payload and trailing bytes
    pub pad_byte: bool,
    pub footer_pos: usize,
}

impl ContainerInfo {
    pub fn header_blob<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[..self.data_pos]
    }

    pub fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.data_pos..self.data_pos + self.data_size]
    }

    pub fn footer_blob<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.footer_pos..]
    }
}

/// detect and parse a WAV or AIFF container
pub fn scan(bytes: &[u8]) -> Result<ContainerInfo> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return scan_wav(bytes);
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"FORM" && (&bytes[8..12] == b"AIFF" || &bytes[8..12] == b"AIFC")
    {
        return scan_aiff(bytes);
    }
    bail!("input is neither a WAV nor an AIFF file");
}

/// true when a preserved header blob came from an AIFF container
pub fn is_aiff(header_blob: &[u8]) -> bool {
    header_blob.len() >= 4 && &header_blob[0..4] == b"FORM"
}

/// byte-swap a 16/24/32-bit payload in place (big-endian <-> little-endian)
pub fn swap_endian(buf: &mut [u8], bits: u16) {
    match bits {
        16 => {
            for pair in buf.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }
        24 => {
            for triple in buf.chunks_exact_mut(3) {
                triple.swap(0, 2);
            }
        }
        32 => {
            for quad in buf.chunks_exact_mut(4) {
                quad.reverse();
            }
        }
        _ => {}
    }
}

fn scan_wav(bytes: &[u8]) -> Result<ContainerInfo> {
    let mut pos = 12usize;
    let mut fmt: Option<(u16, u16, u32, u16)> = None;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        let body = pos + 8;

        if id == b"fmt " {
            if size < 16 || body + 16 > bytes.len() {
                bail!("malformed fmt chunk");
            }
            let format_code = u16::from_le_bytes([bytes[body], bytes[body + 1]]);
            let channels = u16::from_le_bytes([bytes[body + 2], bytes[body + 3]]);
            let sample_rate = u32::from_le_bytes([bytes[body + 4], bytes[body + 5], bytes[body + 6], bytes[body + 7]]);
            let bits = u16::from_le_bytes([bytes[body + 14], bytes[body + 15]]);
            fmt = Some((format_code, channels, sample_rate, bits));
        } else if id == b"data" {
            let (format_code, channels, sample_rate, bits) =
                fmt.ok_or_else(|| anyhow::anyhow!("data chunk before fmt chunk"))?;
            if body + size > bytes.len() {
                bail!("data chunk overruns the file");
            }
            let footer_pos = (body + size + size % 2).min(bytes.len());
            return Ok(ContainerInfo {
                format_code,
                bits_per_sample: bits,
                sample_rate,
                channels,
                big_endian: false,
                data_pos: body,
                data_size: size,
                pad_byte: size % 2 == 1 && body + size < bytes.len(),
                footer_pos,
            });
        }

        pos = body + size + size % 2;
    }
    bail!("WAV file has no data chunk");
}

fn scan_aiff(bytes: &[u8]) -> Result<ContainerInfo> {
    let mut pos = 12usize;
    let mut comm: Option<(u16, u16, u32)> = None;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_be_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        let body = pos + 8;

        if id == b"COMM" {
            if size < 18 || body + 18 > bytes.len() {
                bail!("malformed COMM chunk");
            }
            let channels = u16::from_be_bytes([bytes[body], bytes[body + 1]]);
            let bits = u16::from_be_bytes([bytes[body + 6], bytes[body + 7]]);
            let sample_rate = parse_extended_rate(&bytes[body + 8..body + 18]);
            comm = Some((channels, bits, sample_rate));
        } else if id == b"SSND" {
            let (channels, bits, sample_rate) =
                comm.ok_or_else(|| anyhow::anyhow!("SSND chunk before COMM chunk"))?;
            if size < 8 || body + size > bytes.len() {
                bail!("SSND chunk overruns the file");
            }
            let offset =
                u32::from_be_bytes([bytes[body], bytes[body + 1], bytes[body + 2], bytes[body + 3]]) as usize;
            if offset + 8 > size {
                bail!("SSND offset exceeds the chunk");
            }
            let data_pos = body + 8 + offset;
            let data_size = size - 8 - offset;
            let footer_pos = (body + size + size % 2).min(bytes.len());
            return Ok(ContainerInfo {
                format_code: 1, // AIFF audio is integer PCM
                bits_per_sample: bits,
                sample_rate,
                channels,
                big_endian: true,
                data_pos,
                data_size,
                pad_byte: size % 2 == 1 && body + size < bytes.len(),
                footer_pos,
            });
        }

        pos = body + size + size % 2;
    }
    bail!("AIFF file has no SSND chunk");
}

/// 80-bit IEEE extended sample rate from a COMM chunk
fn parse_extended_rate(raw: &[u8]) -> u32 {
    let exp = u16::from_be_bytes([raw[0], raw[1]]);
    let mut mant: u64 = 0;
    for &b in &raw[2..10] {
        mant = (mant << 8) | b as u64;
    }
    if exp > 16383 && exp < 16383 + 64 {
        (mant >> (63 - (exp - 16383))) as u32
    } else {
        44100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_wav(payload: &[u8], footer: &[u8]) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(b"RIFF");
        f.extend_from_slice(&0u32.to_le_bytes()); // lazily-sized, scanner ignores it
        f.extend_from_slice(b"WAVE");
        f.extend_from_slice(b"fmt ");
        f.extend_from_slice(&16u32.to_le_bytes());
        f.extend_from_slice(&1u16.to_le_bytes()); // PCM
        f.extend_from_slice(&2u16.to_le_bytes()); // stereo
        f.extend_from_slice(&44100u32.to_le_bytes());
        f.extend_from_slice(&176400u32.to_le_bytes());
        f.extend_from_slice(&4u16.to_le_bytes());
        f.extend_from_slice(&16u16.to_le_bytes());
        f.extend_from_slice(b"data");
        f.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        f.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            f.push(0);
        }
        f.extend_from_slice(footer);
        f
    }

    #[test]
    fn test_wav_scan() {
        let file = tiny_wav(&[1, 2, 3, 4], b"LIST");
        let info = scan(&file).unwrap();
        assert_eq!(info.format_code, 1);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.payload(&file), &[1, 2, 3, 4]);
        assert_eq!(info.footer_blob(&file), b"LIST");
        assert!(!info.pad_byte);
    }

    #[test]
    fn test_wav_odd_payload_pad() {
        let file = tiny_wav(&[1, 2, 3], b"tail");
        let info = scan(&file).unwrap();
        assert_eq!(info.data_size, 3);
        assert!(info.pad_byte);
        assert_eq!(info.footer_blob(&file), b"tail");
    }

    #[test]
    fn test_not_a_container() {
        assert!(scan(b"OggS....").is_err());
    }

    #[test]
    fn test_extended_rate() {
        // 44100 = 0x400E AC44...
        let raw = [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];
        assert_eq!(parse_extended_rate(&raw), 44100);
        // 48000 = 0x400E BB80...
        let raw = [0x40, 0x0E, 0xBB, 0x80, 0, 0, 0, 0, 0, 0];
        assert_eq!(parse_extended_rate(&raw), 48000);
    }

    #[test]
    fn test_swap_endian_involution() {
        let mut buf = vec![1u8, 2, 3, 4, 5, 6];
        let orig = buf.clone();
        swap_endian(&mut buf, 24);
        assert_ne!(buf, orig);
        swap_endian(&mut buf, 24);
        assert_eq!(buf, orig);
    }
}
