//! Velox metadata block
//!
//! Vorbis-style ordered KEY=VALUE tags plus one optional attached picture,
//! serialized as a length-prefixed block padded to a 4 KiB boundary so tags
//! can be rewritten in place without moving the audio payload.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::types::{VeloxError, VeloxResult, VENDOR};

/// metadata blocks are padded to a multiple of this
const ALIGN: usize = 4096;

/// Attached picture (cover art)
#[derive(Debug, Clone, Serialize)]
pub struct Picture {
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
    /// Binary picture data
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Tag store written into the envelope between header and preserved blobs
#[derive(Debug, Clone, Serialize)]
pub struct VeloxMetadata {
    pub vendor: String,
    /// uppercase key -> value, deterministic order
    pub tags: BTreeMap<String, String>,
    pub picture: Option<Picture>,
}

impl VeloxMetadata {
    pub fn new() -> Self {
        VeloxMetadata {
            vendor: VENDOR.to_string(),
            tags: BTreeMap::new(),
            picture: None,
        }
    }

    /// insert a tag; keys are uppercased ASCII on write
    pub fn set_tag(&mut self, key: &str, value: &str) {
        self.tags
            .insert(key.to_ascii_uppercase(), value.to_string());
    }

    /// case-insensitive lookup
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(&key.to_ascii_uppercase()).map(|s| s.as_str())
    }

    pub fn set_picture(&mut self, mime_type: &str, data: Vec<u8>) {
        self.picture = Some(Picture {
            mime_type: mime_type.to_string(),
            data,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.picture.is_none()
    }

    /// serialize the whole block: 4-byte payload size, payload, zero padding
    pub fn to_block(&self) -> Vec<u8> {
        let mut payload = Vec::new();

        write_string(&mut payload, &self.vendor);

        payload.extend_from_slice(&(self.tags.len() as u32).to_le_bytes());
        for (key, value) in &self.tags {
            write_string(&mut payload, &format!("{}={}", key, value));
        }

        match &self.picture {
            Some(pic) => {
                payload.push(1);
                write_string(&mut payload, &pic.mime_type);
                payload.extend_from_slice(&(pic.data.len() as u32).to_le_bytes());
                payload.extend_from_slice(&pic.data);
            }
            None => payload.push(0),
        }

        // pad so the size word plus payload land on a 4 KiB boundary;
        // a block that is already aligned gets a full extra page of slack
        let current = 4 + payload.len();
        let padding = match current % ALIGN {
            0 => ALIGN,
            rem => ALIGN - rem,
        };

        let total = payload.len() + padding;
        let mut block = Vec::with_capacity(4 + total);
        block.extend_from_slice(&(total as u32).to_le_bytes());
        block.extend_from_slice(&payload);
        block.resize(4 + total, 0);
        block
    }

    /// parse a block payload (the bytes after the 4-byte size word)
    pub fn parse(payload: &[u8]) -> VeloxResult<Self> {
        let mut cursor = MetaCursor::new(payload);

        let vendor = cursor.read_string()?;

        let count = cursor.read_u32()? as usize;
        let mut tags = BTreeMap::new();
        for _ in 0..count {
            let entry = cursor.read_string()?;
            if let Some(eq) = entry.find('=') {
                let (key, value) = entry.split_at(eq);
                tags.insert(key.to_ascii_uppercase(), value[1..].to_string());
            }
        }

        let picture = if cursor.read_u8()? == 1 {
            let mime_type = cursor.read_string()?;
            let len = cursor.read_u32()? as usize;
            let data = cursor.read_bytes(len)?.to_vec();
            Some(Picture { mime_type, data })
        } else {
            None
        };

        Ok(VeloxMetadata {
            vendor,
            tags,
            picture,
        })
    }
}

impl Default for VeloxMetadata {
    fn default() -> Self {
        Self::new()
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

// bounds-checked cursor; every overrun is a corrupt block

struct MetaCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MetaCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        MetaCursor { data, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> VeloxResult<&'a [u8]> {
        if len > self.data.len() - self.pos {
            return Err(VeloxError::MetadataCorrupt);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> VeloxResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> VeloxResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_string(&mut self) -> VeloxResult<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| VeloxError::MetadataCorrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_roundtrip() {
        let mut meta = VeloxMetadata::new();
        meta.set_tag("title", "Nocturne");
        meta.set_tag("Artist", "Anonymous");
        meta.set_picture("image/png", vec![0x89, 0x50, 0x4E, 0x47]);

        let block = meta.to_block();
        assert_eq!(block.len() % ALIGN, 0);

        let parsed = VeloxMetadata::parse(&block[4..]).unwrap();
        assert_eq!(parsed.tag("TITLE"), Some("Nocturne"));
        assert_eq!(parsed.tag("artist"), Some("Anonymous"));
        assert_eq!(parsed.picture.as_ref().unwrap().mime_type, "image/png");
        assert_eq!(parsed.picture.as_ref().unwrap().data.len(), 4);
    }

    #[test]
    fn test_aligned_block_gets_extra_page() {
        let meta = VeloxMetadata::new();
        let block = meta.to_block();
        assert!(block.len() >= ALIGN);
        assert_eq!(block.len() % ALIGN, 0);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut meta = VeloxMetadata::new();
        meta.set_tag("AlBuM", "x");
        assert_eq!(meta.tag("album"), Some("x"));
        assert_eq!(meta.tag("ALBUM"), Some("x"));
    }

    #[test]
    fn test_oversized_length_field_rejected() {
        let mut meta = VeloxMetadata::new();
        meta.set_tag("A", "b");
        let mut block = meta.to_block();
        // corrupt the vendor length to point past the block
        block[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            VeloxMetadata::parse(&block[4..]),
            Err(VeloxError::MetadataCorrupt)
        ));
    }
}
