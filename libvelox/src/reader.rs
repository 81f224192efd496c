use crate::core::metadata::VeloxMetadata;
use crate::core::types::{
    Header, VeloxError, VeloxResult, MAGIC, MAX_SUPPORTED_MAJOR, METADATA_MIN_VERSION,
};

/// a fully parsed velox file
#[derive(Debug, Clone)]
pub struct VeloxFile {
    pub header: Header,
    pub metadata: VeloxMetadata,
    /// verbatim bytes of the source container up to its audio payload
    pub header_blob: Vec<u8>,
    /// verbatim trailing bytes after the source payload
    pub footer_blob: Vec<u8>,
    /// compressed payload for the streaming decoder
    pub payload: Vec<u8>,
}

/// binary reader for the velox envelope
pub struct Reader;

impl Reader {
    pub fn new() -> Self {
        Reader
    }

    pub fn read(&self, data: &[u8]) -> VeloxResult<VeloxFile> {
        let mut cursor = Cursor::new(data);

        let magic = cursor.read_bytes(4)?;
        if magic != MAGIC {
            return Err(VeloxError::InvalidMagic);
        }

        let version = cursor.read_u16_le()?;
        if (version >> 8) as u8 > MAX_SUPPORTED_MAJOR {
            return Err(VeloxError::UnsupportedVersion(version));
        }

        let sample_rate = cursor.read_u32_le()?;
        let channels = cursor.read_u16_le()?;
        let bits_raw = cursor.read_u16_le()?;
        let format_code = cursor.read_u16_le()?;
        let total_samples = cursor.read_u64_le()?;
        let header_blob_size = cursor.read_u32_le()?;
        let footer_blob_size = cursor.read_u32_le()?;

        let header = Header {
            version,
            sample_rate,
            channels,
            bits_per_sample: bits_raw & 0x7FFF,
            pad_byte: bits_raw & 0x8000 != 0,
            format_code,
            total_samples,
            header_blob_size,
            footer_blob_size,
        };

        let metadata = if version >= METADATA_MIN_VERSION {
            let block_size = cursor.read_u32_le()? as usize;
            let block = cursor.read_bytes(block_size)?;
            VeloxMetadata::parse(block)?
        } else {
            VeloxMetadata::new()
        };

        let header_blob = cursor.read_bytes(header_blob_size as usize)?.to_vec();
        let footer_blob = cursor.read_bytes(footer_blob_size as usize)?.to_vec();
        let payload = cursor.rest().to_vec();

        Ok(VeloxFile {
            header,
            metadata,
            header_blob,
            footer_blob,
            payload,
        })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

// cursor helper

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn read_bytes(&mut self, count: usize) -> VeloxResult<&'a [u8]> {
        if count > self.data.len() - self.pos {
            return Err(VeloxError::TruncatedStream);
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_u16_le(&mut self) -> VeloxResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32_le(&mut self) -> VeloxResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64_le(&mut self) -> VeloxResult<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
