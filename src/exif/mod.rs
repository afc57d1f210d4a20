//! EXIF extraction and normalization.
//!
//! Fields are read with `kamadak-exif` and pass through three stages:
//!
//! 1. **Raw** ([`RawTag`]): each primary-image field becomes a [`RawValue`]
//!    named after its tag. GPS fields are gathered into a single `GPSInfo`
//!    entry keyed by GPS tag number. Oversized values are cut down here.
//! 2. **Processed** ([`ProcessedTag`]): fields with a formatting rule (see
//!    [`format`]) get their display form; everything else is coerced
//!    generically.
//! 3. **Record** ([`ExifRecord`]): only truthy processed values survive,
//!    plus `latitude`/`longitude` when the GPS block resolves.
//!
//! Missing fields are simply absent. Only I/O failures of the underlying
//! stream are reported as errors; a missing or malformed EXIF block yields an
//! empty record.

pub mod format;
pub mod gps;
pub mod lookups;
pub mod raw;
pub mod value;

pub use gps::GpsCoordinate;
pub use raw::{Ratio, RawValue};
pub use value::ExifValue;

use exif::{Context, Field, In, Tag};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Seek, SeekFrom};
use thiserror::Error;
use tracing::debug;

/// Name of the entry holding the gathered GPS block.
pub const GPS_INFO_NAME: &str = "GPSInfo";

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A decoded field before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTag {
    pub tag: Tag,
    pub name: String,
    pub raw_value: RawValue,
}

impl RawTag {
    pub fn tag_code(&self) -> u16 {
        self.tag.number()
    }
}

/// A field after its formatting rule (or generic coercion) has run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTag {
    pub tag_code: u16,
    pub name: String,
    pub raw_value: RawValue,
    pub processed_value: ExifValue,
}

impl From<RawTag> for ProcessedTag {
    fn from(raw: RawTag) -> Self {
        let processed_value = format::format_tag(raw.tag, &raw.raw_value)
            .unwrap_or_else(|| raw.raw_value.coerce());
        ProcessedTag {
            tag_code: raw.tag_code(),
            name: raw.name,
            raw_value: raw.raw_value,
            processed_value,
        }
    }
}

/// Processed EXIF values by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExifRecord(BTreeMap<String, ExifValue>);

impl ExifRecord {
    pub fn get(&self, name: &str) -> Option<&ExifValue> {
        self.0.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ExifValue::as_text)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.get("latitude").and_then(ExifValue::as_f64)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get("longitude").and_then(ExifValue::as_f64)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ExifValue) {
        self.0.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExifValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Display name for a tag. `PhotographicSensitivity` keeps its EXIF 2.2
/// name so stored records stay compatible.
pub fn tag_name(tag: Tag) -> String {
    if tag == Tag::PhotographicSensitivity {
        "ISOSpeedRatings".to_string()
    } else {
        tag.to_string()
    }
}

/// Read and normalize the EXIF block of an image stream.
pub fn extract_exif<R: BufRead + Seek>(reader: &mut R) -> Result<ExifRecord, ExifError> {
    reader.seek(SeekFrom::Start(0))?;
    let exif = match exif::Reader::new().read_from_container(reader) {
        Ok(exif) => exif,
        // A container that ends early is malformed, not a failing stream
        Err(exif::Error::Io(e)) if e.kind() != io::ErrorKind::UnexpectedEof => {
            return Err(ExifError::Io(e));
        }
        Err(e) => {
            debug!("No usable EXIF data: {e}");
            return Ok(ExifRecord::default());
        }
    };
    Ok(process_fields(exif.fields()))
}

/// Run the full pipeline over already-decoded fields.
pub fn process_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) -> ExifRecord {
    let (raw, gps) = collect_raw(fields);

    let mut record = ExifRecord::default();
    for tag in raw.into_iter().map(ProcessedTag::from) {
        if tag.processed_value.is_truthy() {
            record.insert(tag.name, tag.processed_value);
        }
    }

    let position = GpsCoordinate::from_gps_block(&gps);
    for (name, value) in [("latitude", position.latitude), ("longitude", position.longitude)] {
        if let Some(v) = value.filter(|v| *v != 0.0) {
            record.insert(name, ExifValue::Float(v));
        }
    }
    record
}

/// Primary-image fields as raw tags, plus the unguarded GPS block used for
/// coordinate resolution.
pub fn collect_raw<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
) -> (Vec<RawTag>, BTreeMap<u16, RawValue>) {
    let mut tags = Vec::new();
    let mut gps = BTreeMap::new();

    for field in fields {
        if field.ifd_num != In::PRIMARY {
            continue;
        }
        let Some(value) = RawValue::from_exif(&field.value) else {
            continue;
        };
        match field.tag.context() {
            Context::Gps => {
                gps.insert(field.tag.number(), value);
            }
            Context::Tiff | Context::Exif if is_reported(field.tag) => tags.push(RawTag {
                tag: field.tag,
                name: tag_name(field.tag),
                raw_value: value.guarded(),
            }),
            _ => {}
        }
    }

    if !gps.is_empty() {
        tags.push(RawTag {
            tag: Tag::GPSInfoIFDPointer,
            name: GPS_INFO_NAME.to_string(),
            raw_value: RawValue::Dict(gps.clone()).guarded(),
        });
    }
    (tags, gps)
}

fn is_reported(tag: Tag) -> bool {
    let pointer = matches!(
        tag,
        Tag::ExifIFDPointer | Tag::GPSInfoIFDPointer | Tag::InteropIFDPointer
    );
    !pointer && tag.description().is_some()
}
