//! Frontend plumbing for the velox CLI: container scanning, tag import and
//! the byte-level encode/decode pipelines the binary wraps with file I/O.

use anyhow::{bail, Result};

use libvelox::codec::format;
use libvelox::{
    encode_block, FloatMode, Header, Reader, StreamingDecoder, VeloxMetadata, Writer,
    FORMAT_FLOAT, VERSION,
};

pub mod container;
pub mod tags;

/// tag overrides supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct TagOverrides {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Compress a WAV/AIFF file image into a velox file image.
///
/// Tags found in the source (ID3v2, RIFF INFO) are imported first, then the
/// overrides win. The container's bytes around the audio payload are carried
/// verbatim so [`decode_file`] can reproduce the input exactly.
pub fn encode_file(bytes: &[u8], overrides: &TagOverrides) -> Result<Vec<u8>> {
    let src = container::scan(bytes)?;

    let mut payload = src.payload(bytes).to_vec();
    if src.big_endian {
        container::swap_endian(&mut payload, src.bits_per_sample);
    }

    let is_float = src.format_code == FORMAT_FLOAT;
    let (samples, exponents) = if is_float {
        if src.bits_per_sample != 32 {
            bail!("only 32-bit float audio is supported");
        }
        format::split_float32(&payload)
    } else {
        (
            format::bytes_to_samples(&payload, src.bits_per_sample)?,
            Vec::new(),
        )
    };

    let compressed = encode_block(&samples, is_float, &exponents);

    let mut meta = VeloxMetadata::new();
    tags::import_tags(bytes, &mut meta);
    if let Some(t) = &overrides.title {
        meta.set_tag("TITLE", t);
    }
    if let Some(a) = &overrides.artist {
        meta.set_tag("ARTIST", a);
    }
    if let Some(a) = &overrides.album {
        meta.set_tag("ALBUM", a);
    }

    let header = Header {
        version: VERSION,
        sample_rate: src.sample_rate,
        channels: src.channels,
        bits_per_sample: src.bits_per_sample,
        pad_byte: src.pad_byte,
        format_code: src.format_code,
        total_samples: samples.len() as u64,
        header_blob_size: src.data_pos as u32,
        footer_blob_size: (bytes.len() - src.footer_pos) as u32,
    };

    Ok(Writer::new().write(
        &header,
        &meta,
        src.header_blob(bytes),
        src.footer_blob(bytes),
        &compressed,
    ))
}

/// Reconstruct the original container file image from a velox file image.
pub fn decode_file(data: &[u8]) -> Result<Vec<u8>> {
    let file = Reader::new().read(data)?;
    let header = &file.header;

    let mut dec = StreamingDecoder::new(&file.payload, header.total_samples)?;
    let genuine_float =
        header.format_code == FORMAT_FLOAT && dec.float_mode() == FloatMode::Genuine;

    let mut samples = Vec::with_capacity(header.total_samples as usize);
    let mut exponents = Vec::new();
    while let Some((sample, exp)) = dec.decode_next()? {
        samples.push(sample);
        if genuine_float {
            exponents.push(exp);
        }
    }

    let mut raw = Vec::new();
    if header.format_code == FORMAT_FLOAT {
        match dec.float_mode() {
            FloatMode::Genuine => format::merge_float32(&samples, &exponents, &mut raw),
            mode => format::promote_to_bytes(&samples, mode, &mut raw),
        }
    } else {
        format::samples_to_bytes(&samples, header.bits_per_sample, &mut raw);
    }

    if container::is_aiff(&file.header_blob) {
        container::swap_endian(&mut raw, header.bits_per_sample);
    }

    let mut out =
        Vec::with_capacity(file.header_blob.len() + raw.len() + 1 + file.footer_blob.len());
    out.extend_from_slice(&file.header_blob);
    out.extend_from_slice(&raw);
    if header.pad_byte {
        out.push(0);
    }
    out.extend_from_slice(&file.footer_blob);
    Ok(out)
}
