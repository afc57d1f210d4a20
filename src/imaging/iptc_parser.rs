//! IPTC-IIM block location and dataset parsing for JPEG and TIFF files.
//!
//! For JPEG: reads from APP13 marker (Photoshop 8BIM resource 0x0404).
//! For TIFF: reads from IFD tag 33723 (IPTC-NAA, raw IIM bytes), then falls
//! back to tag 34377 (Photoshop image resources holding the same 8BIM block).
//!
//! The parser only knows about the wire format. Mapping dataset numbers to
//! named fields lives in [`crate::iptc`].

use super::container::{ByteOrder, Container};

/// One IIM dataset as it appears in the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset<'a> {
    pub record: u8,
    pub number: u8,
    pub data: &'a [u8],
}

/// Locate the raw IPTC-IIM bytes inside an image container.
pub fn find_iim_block(bytes: &[u8], container: Container) -> Option<&[u8]> {
    match container {
        Container::Jpeg => find_jpeg_app13_iptc(bytes),
        Container::Tiff(order) => find_tiff_iptc(bytes, order),
    }
}

// ---------------------------------------------------------------------------
// IPTC-IIM record parsing
// ---------------------------------------------------------------------------

const TAG_MARKER: u8 = 0x1C;

/// Parse raw IPTC-IIM bytes into datasets, in file order.
///
/// IIM record format (each dataset):
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    Record number
///   Byte 2:    Dataset number
///   Bytes 3-4: Data length (big-endian u16). When the high bit is set the
///              low 15 bits give the size of the length field that follows.
///   Bytes 5+:  Data
pub fn parse_iim(data: &[u8]) -> Vec<Dataset<'_>> {
    let mut datasets = Vec::new();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != TAG_MARKER {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let number = data[pos + 2];
        let mut length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if length & 0x8000 != 0 {
            // Extended dataset: the real length is stored in the next N bytes
            let size = length & 0x7FFF;
            if size == 0 || size > 4 || pos + size > data.len() {
                break;
            }
            length = data[pos..pos + size]
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize);
            pos += size;
        }

        let Some(end) = pos.checked_add(length).filter(|end| *end <= data.len()) else {
            break;
        };

        datasets.push(Dataset {
            record,
            number,
            data: &data[pos..end],
        });
        pos = end;
    }

    datasets
}

// ---------------------------------------------------------------------------
// JPEG: extract IPTC from APP13 / Photoshop 8BIM
// ---------------------------------------------------------------------------

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

const APP13: u8 = 0xED;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

/// Find the raw IPTC-IIM bytes inside a JPEG's APP13 segment.
///
/// Walks the marker segments from SOI up to the start of scan data.
fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes may precede a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == SOS || marker == EOI {
            return None;
        }
        // Markers without length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == APP13 {
            if let Some(iptc) = extract_iptc_from_8bim(&data[pos + 4..seg_end]) {
                return Some(iptc);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

/// Extract IPTC-IIM bytes from a Photoshop 8BIM resource block.
///
/// Input: segment data after the JPEG marker header, starting with
/// "Photoshop 3.0\0" or directly with "8BIM" entries.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // Each resource: "8BIM" (4) + resource_id (2) + pascal_string + data_len (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string: 1 byte length + string, padded to even
        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if pos + res_len > data.len() {
            break;
        }

        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }

        // Advance past data, padded to even
        pos += res_len + (res_len % 2);
    }

    None
}

// ---------------------------------------------------------------------------
// TIFF: extract IPTC from IFD tags
// ---------------------------------------------------------------------------

const TAG_IPTC_NAA: u16 = 33723;
const TAG_PHOTOSHOP: u16 = 34377;
const MAX_IFDS: usize = 16;

/// TIFF type sizes: count is number of values, not bytes.
fn type_size(typ: u16) -> usize {
    match typ {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

/// Read IPTC-IIM bytes from a TIFF file, walking the IFD chain.
fn find_tiff_iptc(data: &[u8], order: ByteOrder) -> Option<&[u8]> {
    let mut ifd_offset = order.read_u32(data, 4)? as usize;
    let mut fallback = None;

    for _ in 0..MAX_IFDS {
        if ifd_offset == 0 {
            break;
        }
        let Some(entry_count) = order.read_u16(data, ifd_offset) else {
            break;
        };
        let entry_count = entry_count as usize;
        let entries_start = ifd_offset + 2;

        for i in 0..entry_count {
            let entry = entries_start + i * 12;
            let tag = order.read_u16(data, entry)?;
            let typ = order.read_u16(data, entry + 2)?;
            let count = order.read_u32(data, entry + 4)? as usize;
            let byte_len = count.saturating_mul(type_size(typ));

            if tag != TAG_IPTC_NAA && tag != TAG_PHOTOSHOP {
                continue;
            }

            // Values of four bytes or less live inside the entry itself
            let value = if byte_len <= 4 {
                data.get(entry + 8..entry + 8 + byte_len)
            } else {
                let offset = order.read_u32(data, entry + 8)? as usize;
                offset
                    .checked_add(byte_len)
                    .and_then(|end| data.get(offset..end))
            };
            let Some(value) = value else { continue };

            if tag == TAG_IPTC_NAA {
                return Some(value);
            }
            if fallback.is_none() {
                fallback = extract_iptc_from_8bim(value);
            }
        }

        let Some(next) = order.read_u32(data, entries_start + entry_count * 12) else {
            break;
        };
        ifd_offset = next as usize;
    }

    fallback
}
