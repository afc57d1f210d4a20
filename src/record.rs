//! The captioned image record and the create-time merge rule.
//!
//! A [`CaptionedImage`] is populated from extracted [`Metadata`] exactly once,
//! when it is created. There is no save hook: callers either use
//! [`CaptionedImage::create`], or run [`extract_metadata`] and
//! [`apply_to_new_record`] themselves before persisting a new record.
//!
//! ## Field mapping
//!
//! | Source | Target | Rule |
//! |---|---|---|
//! | IPTC `headline` | `title`, `alt` | trim, truncate |
//! | IPTC `credit`, `byline`, `copyright_notice` | same name | trim, truncate |
//! | IPTC `instructions` | `usage_terms` | trim, truncate, trim |
//! | IPTC `caption` | `caption` | paragraph markup unless already marked up |
//! | EXIF `Make`, `Model`, `LensMake`, `LensModel` | `camera_*`, `lens_*` | trim, strip NULs, truncate |
//! | EXIF `FocalLength`, `ExposureTime` | `focal_length`, `shutter_speed` | trim, strip NULs, truncate |
//! | EXIF `ApertureValue` | `aperture` | `f/4.00` |
//! | EXIF `ISOSpeedRatings` | `iso_rating` | `400ISO` |
//! | EXIF `DateTimeOriginal` | `date_time_original` | when it parsed as a timestamp |
//! | EXIF `latitude`, `longitude` | same name | copied |
//!
//! Truncation limits text to [`MAX_FIELD_CHARS`] characters, ending in `…`
//! when cut.

use crate::exif::{ExifError, ExifRecord, ExifValue};
use crate::iptc::{IptcField, IptcRecord};
use crate::metadata::{Metadata, extract_metadata};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::{BufRead, Seek};

/// Length limit of the single-line text fields.
pub const MAX_FIELD_CHARS: usize = 255;

const ELLIPSIS: char = '…';

/// An image record with caption and credit fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaptionedImage {
    pub title: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub credit: String,
    pub byline: String,
    pub usage_terms: String,
    pub copyright_notice: String,
    pub iptc_data: IptcRecord,
    /// Present when the record stores EXIF-derived fields.
    #[serde(flatten)]
    pub exif: Option<ExifFields>,
}

/// Camera and capture details of an EXIF-capable record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifFields {
    pub exif_data: ExifRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<NaiveDateTime>,
    pub camera_make: String,
    pub camera_model: String,
    pub lens_make: String,
    pub lens_model: String,
    pub focal_length: String,
    pub shutter_speed: String,
    pub aperture: String,
    pub iso_rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CaptionedImage {
    /// A blank record without EXIF fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// A blank record that also stores EXIF fields.
    pub fn with_exif(title: impl Into<String>) -> Self {
        Self {
            exif: Some(ExifFields::default()),
            ..Self::new(title)
        }
    }

    pub fn supports_exif(&self) -> bool {
        self.exif.is_some()
    }

    /// Build a new record from an image stream.
    ///
    /// `title` is kept unless the image carries a headline. EXIF is only
    /// read when `with_exif` is set.
    pub fn create<R: BufRead + Seek>(
        title: impl Into<String>,
        reader: &mut R,
        with_exif: bool,
    ) -> Result<Self, ExifError> {
        let mut record = if with_exif {
            Self::with_exif(title)
        } else {
            Self::new(title)
        };
        let metadata = extract_metadata(reader, record.supports_exif())?;
        apply_to_new_record(&mut record, &metadata);
        Ok(record)
    }
}

/// Populate a freshly created record from extracted metadata.
///
/// Must only run on records that have never been saved. Fields without a
/// source value keep what the record already holds.
pub fn apply_to_new_record(record: &mut CaptionedImage, metadata: &Metadata) {
    let iptc = &metadata.iptc;

    if let Some(headline) = iptc.text(IptcField::Headline) {
        let title = truncate_chars(headline.trim(), MAX_FIELD_CHARS);
        record.alt = title.clone();
        record.title = title;
    }
    if let Some(credit) = iptc.text(IptcField::Credit) {
        record.credit = truncate_chars(credit.trim(), MAX_FIELD_CHARS);
    }
    if let Some(caption) = iptc.text(IptcField::Caption) {
        record.caption = Some(if starts_with_block_tag(caption) {
            caption.trim().to_string()
        } else {
            linebreaks(caption.trim())
        });
    }
    if let Some(byline) = iptc.text(IptcField::Byline) {
        record.byline = truncate_chars(byline.trim(), MAX_FIELD_CHARS);
    }
    if let Some(instructions) = iptc.text(IptcField::Instructions) {
        record.usage_terms = truncate_chars(instructions.trim(), MAX_FIELD_CHARS)
            .trim()
            .to_string();
    }
    if let Some(notice) = iptc.text(IptcField::CopyrightNotice) {
        record.copyright_notice = truncate_chars(notice.trim(), MAX_FIELD_CHARS);
    }
    record.iptc_data = iptc.clone();

    if let (Some(fields), Some(exif)) = (record.exif.as_mut(), metadata.exif.as_ref()) {
        apply_exif(fields, exif);
    }
}

fn apply_exif(fields: &mut ExifFields, exif: &ExifRecord) {
    let targets = [
        ("Make", &mut fields.camera_make),
        ("Model", &mut fields.camera_model),
        ("LensMake", &mut fields.lens_make),
        ("LensModel", &mut fields.lens_model),
        ("FocalLength", &mut fields.focal_length),
        ("ExposureTime", &mut fields.shutter_speed),
    ];
    for (name, target) in targets {
        if let Some(value) = exif.get(name) {
            *target = clean_text(value);
        }
    }

    if let Some(aperture) = exif.get("ApertureValue").and_then(ExifValue::as_f64) {
        fields.aperture = format!("f/{aperture:.2}");
    }
    if let Some(iso) = exif.get("ISOSpeedRatings") {
        fields.iso_rating = format!("{iso}ISO");
    }
    if let Some(ExifValue::DateTime(taken)) = exif.get("DateTimeOriginal") {
        fields.date_time_original = Some(*taken);
    }
    if let Some(latitude) = exif.latitude() {
        fields.latitude = Some(latitude);
    }
    if let Some(longitude) = exif.longitude() {
        fields.longitude = Some(longitude);
    }
    fields.exif_data = exif.clone();
}

fn clean_text(value: &ExifValue) -> String {
    let text = value.to_string();
    truncate_chars(text.trim().trim_end_matches('\0'), MAX_FIELD_CHARS)
}

/// Limit `text` to `max` characters. Longer text keeps its first `max - 1`
/// characters followed by `…`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

/// Whether the text opens with a `<p…>`/`<div…>`-like tag.
///
/// Matches a `<`, then one of `p`, `d`, `i`, `v` or `|`, then a `>`
/// somewhere on the same line.
pub fn starts_with_block_tag(text: &str) -> bool {
    let mut chars = text.chars();
    if chars.next() != Some('<') {
        return false;
    }
    if !matches!(chars.next(), Some('p' | 'd' | 'i' | 'v' | '|')) {
        return false;
    }
    chars.take_while(|c| *c != '\n').any(|c| c == '>')
}

/// Convert plain text into paragraph markup.
///
/// Blank lines separate paragraphs, single newlines become `<br>`. The text
/// is not escaped.
pub fn linebreaks(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut paragraphs = Vec::new();
    let mut rest = normalized.as_str();
    while let Some(start) = rest.find("\n\n") {
        paragraphs.push(&rest[..start]);
        rest = rest[start..].trim_start_matches('\n');
    }
    paragraphs.push(rest);

    paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n\n")
}
