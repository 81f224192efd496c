use crate::core::metadata::VeloxMetadata;
use crate::core::types::{Header, MAGIC, VERSION};

/// binary writer for the velox envelope
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// Assemble a complete file: fixed header, metadata block, preserved
    /// container blobs, compressed payload.
    pub fn write(
        mut self,
        header: &Header,
        metadata: &VeloxMetadata,
        header_blob: &[u8],
        footer_blob: &[u8],
        payload: &[u8],
    ) -> Vec<u8> {
        self.write_header(header, header_blob.len() as u32, footer_blob.len() as u32);
        self.buffer.extend_from_slice(&metadata.to_block());
        self.buffer.extend_from_slice(header_blob);
        self.buffer.extend_from_slice(footer_blob);
        self.buffer.extend_from_slice(payload);
        self.buffer
    }

    fn write_header(&mut self, header: &Header, header_blob_size: u32, footer_blob_size: u32) {
        // Magic "VELX"
        self.buffer.extend_from_slice(&MAGIC);

        // Version (u16 LE)
        self.buffer.extend_from_slice(&VERSION.to_le_bytes());

        // Sample Rate (u32 LE)
        self.buffer
            .extend_from_slice(&header.sample_rate.to_le_bytes());

        // Channels (u16 LE)
        self.buffer.extend_from_slice(&header.channels.to_le_bytes());

        // Bits Per Sample (u16 LE): low 15 bits width, high bit = pad flag
        let mut bits = header.bits_per_sample & 0x7FFF;
        if header.pad_byte {
            bits |= 0x8000;
        }
        self.buffer.extend_from_slice(&bits.to_le_bytes());

        // Format Code (u16 LE)
        self.buffer
            .extend_from_slice(&header.format_code.to_le_bytes());

        // Total Samples (u64 LE), interleaved count
        self.buffer
            .extend_from_slice(&header.total_samples.to_le_bytes());

        // Preserved blob sizes (u32 LE each)
        self.buffer.extend_from_slice(&header_blob_size.to_le_bytes());
        self.buffer.extend_from_slice(&footer_blob_size.to_le_bytes());
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
