//! Tag import from the source container: ID3v2 text frames and RIFF
//! LIST-INFO sub-chunks, mapped onto the Vorbis-style tag keys.

use libvelox::VeloxMetadata;

/// harvest whatever tags the source carries into `meta`
pub fn import_tags(bytes: &[u8], meta: &mut VeloxMetadata) {
    if bytes.len() >= 10 && &bytes[0..3] == b"ID3" {
        parse_id3v2(bytes, meta);
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" {
        parse_riff_info(bytes, meta);
    }
}

fn clean(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches('\0')
        .to_string()
}

fn parse_id3v2(bytes: &[u8], meta: &mut VeloxMetadata) {
    // syncsafe tag size
    let size = ((bytes[6] as usize) << 21)
        | ((bytes[7] as usize) << 14)
        | ((bytes[8] as usize) << 7)
        | bytes[9] as usize;
    let end = (10 + size).min(bytes.len());

    let mut pos = 10usize;
    while pos + 10 <= end {
        let id = &bytes[pos..pos + 4];
        if id[0] == 0 {
            break;
        }
        let fsize =
            u32::from_be_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        pos += 10;
        if fsize == 0 || pos + fsize > end {
            break;
        }

        // first content byte is the text encoding marker
        let value = if fsize > 1 {
            clean(&bytes[pos + 1..pos + fsize])
        } else {
            String::new()
        };

        match id {
            b"TIT2" => meta.set_tag("TITLE", &value),
            b"TPE1" => meta.set_tag("ARTIST", &value),
            b"TALB" => meta.set_tag("ALBUM", &value),
            _ => {}
        }
        pos += fsize;
    }
}

fn parse_riff_info(bytes: &[u8], meta: &mut VeloxMetadata) {
    let mut pos = 12usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        let body = pos + 8;

        if id == b"LIST" && size >= 4 && body + size <= bytes.len() && &bytes[body..body + 4] == b"INFO"
        {
            let mut sub = body + 4;
            let list_end = body + size;
            while sub + 8 <= list_end {
                let sub_id = &bytes[sub..sub + 4];
                let sub_size =
                    u32::from_le_bytes([bytes[sub + 4], bytes[sub + 5], bytes[sub + 6], bytes[sub + 7]]) as usize;
                let sub_body = sub + 8;
                if sub_body + sub_size > list_end {
                    break;
                }
                let value = clean(&bytes[sub_body..sub_body + sub_size]);
                match sub_id {
                    b"INAM" => meta.set_tag("TITLE", &value),
                    b"IART" => meta.set_tag("ARTIST", &value),
                    b"IPRD" => meta.set_tag("ALBUM", &value),
                    _ => {}
                }
                sub = sub_body + sub_size + sub_size % 2;
            }
            return;
        }

        pos = body + size + size % 2;
    }
}
