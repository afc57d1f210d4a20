//! Synthetic image fixtures for unit tests.
//!
//! Builds minimal JPEG and TIFF containers carrying IPTC-IIM datasets
//! and/or EXIF fields, so tests never depend on binary files on disk.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut iim = iim_dataset(2, 105, b"Headline");
//! iim.extend(iim_dataset(2, 25, b"keyword"));
//! let jpeg = jpeg_with_app13(&iim);
//! ```

use exif::Field;
use exif::experimental::Writer;
use std::io::Cursor;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const APP1: u8 = 0xE1;
const APP13: u8 = 0xED;

/// One IIM dataset: tag marker, record, dataset number, 2-byte length, data.
pub fn iim_dataset(record: u8, dataset: u8, data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).unwrap();
    let mut out = vec![0x1C, record, dataset];
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// APP13 payload: Photoshop header plus a single `8BIM` 0x0404 resource.
pub fn photoshop_resource(iim: &[u8]) -> Vec<u8> {
    let mut out = b"Photoshop 3.0\0".to_vec();
    out.extend_from_slice(b"8BIM");
    out.extend_from_slice(&0x0404u16.to_be_bytes());
    // Empty pascal name, padded to even length
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&u32::try_from(iim.len()).unwrap().to_be_bytes());
    out.extend_from_slice(iim);
    if iim.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// A JPEG made of SOI, the given `(marker, payload)` segments, and EOI.
pub fn jpeg(segments: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut out = SOI.to_vec();
    for (marker, payload) in segments {
        let len = u16::try_from(payload.len() + 2).unwrap();
        out.extend_from_slice(&[0xFF, *marker]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(payload);
    }
    out.extend_from_slice(&EOI);
    out
}

pub fn jpeg_with_app13(iim: &[u8]) -> Vec<u8> {
    jpeg(&[(APP13, photoshop_resource(iim))])
}

/// Little-endian TIFF with one IFD holding the IIM bytes in tag 33723.
pub fn tiff_with_iptc(iim: &[u8]) -> Vec<u8> {
    // header (8) + entry count (2) + one entry (12) + next IFD offset (4)
    let data_offset: u32 = 26;
    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&33723u16.to_le_bytes());
    out.extend_from_slice(&7u16.to_le_bytes());
    out.extend_from_slice(&u32::try_from(iim.len()).unwrap().to_le_bytes());
    out.extend_from_slice(&data_offset.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(iim);
    out
}

/// Big-endian TIFF carrying the given EXIF fields.
pub fn tiff_with_exif(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

fn exif_payload(fields: &[Field]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend(tiff_with_exif(fields));
    payload
}

pub fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
    jpeg(&[(APP1, exif_payload(fields))])
}

/// A JPEG carrying both an EXIF APP1 and an IPTC APP13 segment.
pub fn jpeg_with_metadata(fields: &[Field], iim: &[u8]) -> Vec<u8> {
    jpeg(&[(APP1, exif_payload(fields)), (APP13, photoshop_resource(iim))])
}
