//! IPTC extraction: named fields from the IIM Application Record.
//!
//! Only record 2 is mapped, through a fixed table of dataset numbers. The
//! field names follow the IIM specification (`2:105` Headline becomes
//! `headline`, `2:80` By-line becomes `byline`, ...).
//!
//! Extraction never fails: an unreadable stream or an unknown container is
//! logged as a warning, a missing IIM block at info level, and both yield an
//! empty [`IptcRecord`].

use crate::imaging::Container;
use crate::imaging::iptc_parser::{find_iim_block, parse_iim};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};
use tracing::{info, warn};

/// IIM record holding the editorial datasets.
const APPLICATION_RECORD: u8 = 2;

/// Named IPTC fields, in dataset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IptcField {
    ObjectName,
    EditStatus,
    Keywords,
    ReleaseDate,
    ReleaseTime,
    ExpirationDate,
    ExpirationTime,
    Instructions,
    ActionAdvised,
    Byline,
    BylineTitle,
    City,
    SubLocation,
    ProvinceState,
    Country,
    Headline,
    Credit,
    CopyrightNotice,
    Caption,
    WriterEditor,
}

/// Dataset number → field, for record 2.
static DATASETS: [(u8, IptcField); 20] = [
    (5, IptcField::ObjectName),
    (7, IptcField::EditStatus),
    (25, IptcField::Keywords),
    (30, IptcField::ReleaseDate),
    (35, IptcField::ReleaseTime),
    (37, IptcField::ExpirationDate),
    (38, IptcField::ExpirationTime),
    (40, IptcField::Instructions),
    (42, IptcField::ActionAdvised),
    (80, IptcField::Byline),
    (85, IptcField::BylineTitle),
    (90, IptcField::City),
    (92, IptcField::SubLocation),
    (95, IptcField::ProvinceState),
    (100, IptcField::Country),
    (105, IptcField::Headline),
    (110, IptcField::Credit),
    (116, IptcField::CopyrightNotice),
    (120, IptcField::Caption),
    (122, IptcField::WriterEditor),
];

impl IptcField {
    /// Look up the field for a record 2 dataset number.
    pub fn from_dataset(number: u8) -> Option<IptcField> {
        DATASETS
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, field)| *field)
    }

    /// The serialized name, e.g. `copyright_notice`.
    pub fn as_str(self) -> &'static str {
        match self {
            IptcField::ObjectName => "object_name",
            IptcField::EditStatus => "edit_status",
            IptcField::Keywords => "keywords",
            IptcField::ReleaseDate => "release_date",
            IptcField::ReleaseTime => "release_time",
            IptcField::ExpirationDate => "expiration_date",
            IptcField::ExpirationTime => "expiration_time",
            IptcField::Instructions => "instructions",
            IptcField::ActionAdvised => "action_advised",
            IptcField::Byline => "byline",
            IptcField::BylineTitle => "byline_title",
            IptcField::City => "city",
            IptcField::SubLocation => "sub_location",
            IptcField::ProvinceState => "province_state",
            IptcField::Country => "country",
            IptcField::Headline => "headline",
            IptcField::Credit => "credit",
            IptcField::CopyrightNotice => "copyright_notice",
            IptcField::Caption => "caption",
            IptcField::WriterEditor => "writer_editor",
        }
    }

    /// The record 2 dataset number of this field.
    pub fn dataset(self) -> u8 {
        DATASETS
            .iter()
            .find(|(_, field)| *field == self)
            .map(|(n, _)| *n)
            .unwrap_or_default()
    }
}

/// A decoded IPTC value. Repeated datasets become a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IptcValue {
    Text(String),
    List(Vec<String>),
}

impl IptcValue {
    /// The value used for single-valued targets: the text itself, or the
    /// first entry of a list.
    pub fn first(&self) -> Option<&str> {
        match self {
            IptcValue::Text(s) => Some(s),
            IptcValue::List(items) => items.first().map(String::as_str),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            IptcValue::Text(s) => s.is_empty(),
            IptcValue::List(items) => items.is_empty(),
        }
    }
}

/// IPTC fields found in one image. Never holds empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IptcRecord(BTreeMap<IptcField, IptcValue>);

impl IptcRecord {
    pub fn get(&self, field: IptcField) -> Option<&IptcValue> {
        self.0.get(&field)
    }

    /// Single-valued text for a field, see [`IptcValue::first`].
    pub fn text(&self, field: IptcField) -> Option<&str> {
        self.get(field).and_then(IptcValue::first)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IptcField, &IptcValue)> {
        self.0.iter()
    }
}

/// Extract IPTC fields from an image stream (JPEG or TIFF).
///
/// The stream is read from its start. Returns an empty record when the
/// stream cannot be read, the container is not recognized, or no IIM block
/// is present.
pub fn extract_iptc<R: Read + Seek>(reader: &mut R) -> IptcRecord {
    let mut bytes = Vec::new();
    let read = reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_to_end(&mut bytes));
    if let Err(e) = read {
        warn!("Could not read image for IPTC extraction: {e}");
        return IptcRecord::default();
    }
    iptc_from_bytes(&bytes)
}

/// Extract IPTC fields from an in-memory image.
pub fn iptc_from_bytes(bytes: &[u8]) -> IptcRecord {
    let Some(container) = Container::sniff(bytes) else {
        warn!("Cannot identify image file for IPTC extraction");
        return IptcRecord::default();
    };

    let datasets = find_iim_block(bytes, container)
        .map(parse_iim)
        .unwrap_or_default();
    if datasets.is_empty() {
        info!("Image did not contain IPTC data.");
        return IptcRecord::default();
    }

    let mut raw: BTreeMap<IptcField, Vec<String>> = BTreeMap::new();
    for dataset in datasets
        .iter()
        .filter(|d| d.record == APPLICATION_RECORD)
    {
        if let Some(field) = IptcField::from_dataset(dataset.number) {
            raw.entry(field)
                .or_default()
                .push(String::from_utf8_lossy(dataset.data).into_owned());
        }
    }

    let fields = raw
        .into_iter()
        .map(|(field, mut values)| {
            let value = if values.len() == 1 {
                IptcValue::Text(values.remove(0))
            } else {
                IptcValue::List(values)
            };
            (field, value)
        })
        .filter(|(_, value)| !value.is_empty())
        .collect();

    IptcRecord(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{iim_dataset, jpeg_with_app13, tiff_with_iptc};
    use std::io::Cursor;

    fn record_from(iim: &[u8]) -> IptcRecord {
        extract_iptc(&mut Cursor::new(jpeg_with_app13(iim)))
    }

    #[test]
    fn dataset_table_round_trips() {
        for (number, field) in DATASETS.iter() {
            assert_eq!(IptcField::from_dataset(*number), Some(*field));
            assert_eq!(field.dataset(), *number);
        }
    }

    #[test]
    fn maps_known_datasets_to_names() {
        let mut iim = iim_dataset(2, 105, b"Breaking news");
        iim.extend(iim_dataset(2, 110, b"Reuters"));
        iim.extend(iim_dataset(2, 80, b"Jane Doe"));
        iim.extend(iim_dataset(2, 116, b"(c) 2024"));
        iim.extend(iim_dataset(2, 90, b"Oslo"));

        let record = record_from(&iim);
        assert_eq!(record.text(IptcField::Headline), Some("Breaking news"));
        assert_eq!(record.text(IptcField::Credit), Some("Reuters"));
        assert_eq!(record.text(IptcField::Byline), Some("Jane Doe"));
        assert_eq!(record.text(IptcField::CopyrightNotice), Some("(c) 2024"));
        assert_eq!(record.text(IptcField::City), Some("Oslo"));
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn unmapped_datasets_are_dropped() {
        let mut iim = iim_dataset(2, 10, b"urgency");
        iim.extend(iim_dataset(2, 0, b"\x00\x04"));
        iim.extend(iim_dataset(1, 90, b"\x1b%G"));
        iim.extend(iim_dataset(2, 5, b"Title"));

        let record = record_from(&iim);
        assert_eq!(record.len(), 1);
        assert_eq!(record.text(IptcField::ObjectName), Some("Title"));
    }

    #[test]
    fn repeated_datasets_become_lists() {
        let mut iim = iim_dataset(2, 25, b"snow");
        iim.extend(iim_dataset(2, 25, b"winter"));

        let record = record_from(&iim);
        assert_eq!(
            record.get(IptcField::Keywords),
            Some(&IptcValue::List(vec!["snow".into(), "winter".into()]))
        );
        assert_eq!(record.text(IptcField::Keywords), Some("snow"));
    }

    #[test]
    fn empty_values_are_dropped() {
        let mut iim = iim_dataset(2, 105, b"");
        iim.extend(iim_dataset(2, 120, b"Caption"));

        let record = record_from(&iim);
        assert_eq!(record.get(IptcField::Headline), None);
        assert_eq!(record.text(IptcField::Caption), Some("Caption"));
    }

    #[test]
    fn values_are_not_trimmed() {
        let record = record_from(&iim_dataset(2, 105, b"  padded  "));
        assert_eq!(record.text(IptcField::Headline), Some("  padded  "));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let record = record_from(&iim_dataset(2, 90, b"M\xfcnchen"));
        assert_eq!(record.text(IptcField::City), Some("M\u{FFFD}nchen"));
    }

    #[test]
    fn reads_from_tiff() {
        let tiff = tiff_with_iptc(&iim_dataset(2, 120, b"A caption"));
        let record = extract_iptc(&mut Cursor::new(tiff));
        assert_eq!(record.text(IptcField::Caption), Some("A caption"));
    }

    #[test]
    fn image_without_iptc_is_empty() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert!(extract_iptc(&mut Cursor::new(jpeg)).is_empty());
    }

    #[test]
    fn unknown_container_is_empty() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR".to_vec();
        assert!(extract_iptc(&mut Cursor::new(png)).is_empty());
    }

    #[test]
    fn unreadable_stream_is_empty() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }
        impl Seek for Broken {
            fn seek(&mut self, _: SeekFrom) -> std::io::Result<u64> {
                Ok(0)
            }
        }
        assert!(extract_iptc(&mut Broken).is_empty());
    }

    #[test]
    fn record_serializes_with_field_names() {
        let mut iim = iim_dataset(2, 105, b"Headline");
        iim.extend(iim_dataset(2, 25, b"a"));
        iim.extend(iim_dataset(2, 25, b"b"));
        let json = serde_json::to_value(record_from(&iim)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"keywords": ["a", "b"], "headline": "Headline"})
        );
    }

    #[test]
    fn names_match_serialized_form() {
        for (number, field) in DATASETS {
            assert_eq!(IptcField::from_dataset(number), Some(field));
            assert_eq!(field.dataset(), number);
            assert_eq!(
                serde_json::to_value(field).unwrap(),
                serde_json::json!(field.as_str())
            );
        }
    }
}
