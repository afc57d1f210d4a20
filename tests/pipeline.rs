//! End-to-end tests through the public API: synthetic JPEG/TIFF files in,
//! captioned image records and import manifests out.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image_captions::config::{Config, parse_config};
use image_captions::exif::{ExifValue, extract_exif};
use image_captions::import::import_dir_at;
use image_captions::iptc::{IptcField, IptcValue, extract_iptc};
use image_captions::metadata::extract_metadata;
use image_captions::record::{CaptionedImage, apply_to_new_record};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

fn dataset(number: u8, data: &str) -> Vec<u8> {
    let mut out = vec![0x1C, 2, number];
    out.extend_from_slice(&(data.len() as u16).to_be_bytes());
    out.extend_from_slice(data.as_bytes());
    out
}

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn photoshop(iim: &[u8]) -> Vec<u8> {
    let mut out = b"Photoshop 3.0\08BIM".to_vec();
    out.extend_from_slice(&[0x04, 0x04, 0, 0]);
    out.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    out.extend_from_slice(iim);
    if iim.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn exif_tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, true).unwrap();
    buf.into_inner()
}

/// SOI, optional EXIF APP1, optional APP13, EOI.
fn build_jpeg(fields: &[Field], iim: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    if !fields.is_empty() {
        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend(exif_tiff(fields));
        out.extend(segment(0xE1, &app1));
    }
    if !iim.is_empty() {
        out.extend(segment(0xED, &photoshop(iim)));
    }
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

fn ascii(s: &str) -> Value {
    Value::Ascii(vec![s.as_bytes().to_vec()])
}

fn rational(num: u32, denom: u32) -> Value {
    Value::Rational(vec![Rational { num, denom }])
}

fn dms(d: u32, m: u32, s: u32) -> Value {
    Value::Rational(vec![
        Rational { num: d, denom: 1 },
        Rational { num: m, denom: 1 },
        Rational { num: s, denom: 1 },
    ])
}

fn camera_fields() -> Vec<Field> {
    vec![
        field(Tag::Make, ascii("FUJIFILM")),
        field(Tag::Model, ascii("X-T4")),
        field(Tag::FocalLength, rational(23, 1)),
        field(Tag::ExposureTime, rational(1, 250)),
        field(Tag::ApertureValue, rational(4, 1)),
        field(Tag::PhotographicSensitivity, Value::Short(vec![400])),
        field(Tag::DateTimeOriginal, ascii("2023:06:01 18:30:00")),
        field(Tag::GPSLatitudeRef, ascii("S")),
        field(Tag::GPSLatitude, dms(10, 30, 0)),
        field(Tag::GPSLongitudeRef, ascii("E")),
        field(Tag::GPSLongitude, dms(20, 15, 0)),
    ]
}

fn caption_iim() -> Vec<u8> {
    let mut iim = dataset(105, "Fishing boats at dawn");
    iim.extend(dataset(120, "Boats leaving the harbour.\n\nLow tide."));
    iim.extend(dataset(110, "  Jane Doe / Agency  "));
    iim.extend(dataset(80, "Jane Doe"));
    iim.extend(dataset(40, "Editorial use only"));
    iim.extend(dataset(116, "(c) 2023 Jane Doe"));
    iim.extend(dataset(25, "boats"));
    iim.extend(dataset(25, "harbour"));
    iim
}

#[test]
fn full_jpeg_produces_complete_record() {
    let bytes = build_jpeg(&camera_fields(), &caption_iim());
    let record = CaptionedImage::create("DSCF0001.JPG", &mut Cursor::new(bytes), true).unwrap();

    assert_eq!(record.title, "Fishing boats at dawn");
    assert_eq!(record.alt, "Fishing boats at dawn");
    assert_eq!(
        record.caption.as_deref(),
        Some("<p>Boats leaving the harbour.</p>\n\n<p>Low tide.</p>")
    );
    assert_eq!(record.credit, "Jane Doe / Agency");
    assert_eq!(record.byline, "Jane Doe");
    assert_eq!(record.usage_terms, "Editorial use only");
    assert_eq!(record.copyright_notice, "(c) 2023 Jane Doe");
    assert_eq!(
        record.iptc_data.get(IptcField::Keywords),
        Some(&IptcValue::List(vec!["boats".into(), "harbour".into()]))
    );

    let exif = record.exif.as_ref().unwrap();
    assert_eq!(exif.camera_make, "FUJIFILM");
    assert_eq!(exif.camera_model, "X-T4");
    assert_eq!(exif.focal_length, "23.0mm");
    assert_eq!(exif.shutter_speed, "1/250");
    assert_eq!(exif.aperture, "f/4.00");
    assert_eq!(exif.iso_rating, "400ISO");
    assert_eq!(
        exif.date_time_original.map(|d| d.to_string()).as_deref(),
        Some("2023-06-01 18:30:00")
    );
    assert_eq!(exif.latitude, Some(-10.5));
    assert_eq!(exif.longitude, Some(20.25));
    assert!(exif.exif_data.get("GPSInfo").is_some());
}

#[test]
fn two_step_creation_matches_create() {
    let bytes = build_jpeg(&camera_fields(), &caption_iim());

    let metadata = extract_metadata(&mut Cursor::new(bytes.clone()), true).unwrap();
    let mut manual = CaptionedImage::with_exif("DSCF0001.JPG");
    apply_to_new_record(&mut manual, &metadata);

    let created = CaptionedImage::create("DSCF0001.JPG", &mut Cursor::new(bytes), true).unwrap();
    assert_eq!(manual, created);
}

#[test]
fn individual_extractors_agree_with_combined() {
    let bytes = build_jpeg(&camera_fields(), &caption_iim());

    let iptc = extract_iptc(&mut Cursor::new(bytes.clone()));
    let exif = extract_exif(&mut Cursor::new(bytes.clone())).unwrap();
    let metadata = extract_metadata(&mut Cursor::new(bytes), true).unwrap();

    assert_eq!(metadata.iptc, iptc);
    assert_eq!(metadata.exif.as_ref(), Some(&exif));
    assert_eq!(exif.get("Model"), Some(&ExifValue::Text("X-T4".into())));
    assert_eq!(exif.text("ISOSpeedRatings"), None);
    assert_eq!(exif.get("ISOSpeedRatings"), Some(&ExifValue::Int(400)));
}

#[test]
fn image_without_metadata_keeps_defaults() {
    let bytes = build_jpeg(&[], &[]);
    let record = CaptionedImage::create("plain.jpg", &mut Cursor::new(bytes), true).unwrap();

    assert_eq!(record.title, "plain.jpg");
    assert_eq!(record.caption, None);
    assert!(record.iptc_data.is_empty());
    let exif = record.exif.as_ref().unwrap();
    assert!(exif.exif_data.is_empty());
    assert_eq!(exif.latitude, None);
}

#[test]
fn import_directory_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let full = build_jpeg(&camera_fields(), &caption_iim());
    fs::write(tmp.path().join("Boats At Dawn.jpg"), &full).unwrap();
    fs::create_dir(tmp.path().join("backup")).unwrap();
    fs::write(tmp.path().join("backup/copy.jpg"), &full).unwrap();
    fs::write(
        tmp.path().join("portrait.jpeg"),
        build_jpeg(&[], &dataset(105, "Portrait")),
    )
    .unwrap();
    fs::write(tmp.path().join("readme.txt"), "not an image").unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[upload]\nfolder = \"originals\"\ndate_path = \"%Y\"\n",
    )
    .unwrap();

    let config = image_captions::config::load_config(tmp.path()).unwrap();
    let now = chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let manifest = import_dir_at(tmp.path(), &config, now).unwrap();

    let paths: Vec<_> = manifest.images.iter().map(|e| e.upload_path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["originals/2025/Boats_At_Dawn.jpg", "originals/2025/portrait.jpeg"]
    );
    assert_eq!(manifest.images[0].image.title, "Fishing boats at dawn");
    assert_eq!(manifest.images[1].image.title, "Portrait");

    assert_eq!(manifest.duplicates.len(), 1);
    assert_eq!(manifest.duplicates[0].source, tmp.path().join("backup/copy.jpg"));
    assert_eq!(manifest.duplicates[0].original, tmp.path().join("Boats At Dawn.jpg"));

    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(json["images"][0]["image"]["camera_model"], "X-T4");
    assert_eq!(json["images"][0]["image"]["iso_rating"], "400ISO");
}

#[test]
fn disabling_exif_in_config_skips_camera_fields() {
    let config: Config = parse_config("[extract]\nexif = false\n").unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("a.jpg"),
        build_jpeg(&camera_fields(), &caption_iim()),
    )
    .unwrap();

    let now = chrono::Utc::now().naive_utc();
    let manifest = import_dir_at(tmp.path(), &config, now).unwrap();
    let image = &manifest.images[0].image;
    assert_eq!(image.title, "Fishing boats at dawn");
    assert!(image.exif.is_none());
}
