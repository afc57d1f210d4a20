//! Combined metadata extraction for one image.
//!
//! ```text
//! stream ──► extract_iptc ──► IptcRecord ─┐
//!    │                                     ├──► Metadata
//!    └─────► extract_exif ──► ExifRecord ──┘   (EXIF only when requested)
//! ```
//!
//! This is the first half of the two-step creation API. The result is fed to
//! [`crate::record::apply_to_new_record`] once, when a record is created.
//! Nothing is cached: every call reads the stream afresh.

use crate::exif::{ExifError, ExifRecord, extract_exif};
use crate::iptc::{IptcRecord, extract_iptc};
use serde::Serialize;
use std::io::{BufRead, Seek};

/// Everything extracted from one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub iptc: IptcRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif: Option<ExifRecord>,
}

/// Extract IPTC, and EXIF when `with_exif` is set, from an image stream.
///
/// IPTC problems never fail the call. The only error is an I/O failure
/// while reading EXIF.
pub fn extract_metadata<R: BufRead + Seek>(
    reader: &mut R,
    with_exif: bool,
) -> Result<Metadata, ExifError> {
    let iptc = extract_iptc(reader);
    let exif = if with_exif {
        Some(extract_exif(reader)?)
    } else {
        None
    };
    Ok(Metadata { iptc, exif })
}
