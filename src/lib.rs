//! # image-captions
//!
//! Caption and metadata extraction for image libraries. Given a JPEG or TIFF
//! stream, reads the embedded IPTC-IIM and EXIF blocks, normalizes their raw
//! values into display strings, and populates a new [`record::CaptionedImage`]
//! from them.
//!
//! # Architecture: Two-Step Creation
//!
//! ```text
//! 1. Extract   stream    →  Metadata        (IPTC record + optional EXIF record)
//! 2. Apply     Metadata  →  CaptionedImage  (truncation, markup, formatting)
//! ```
//!
//! Both steps are explicit function calls: [`metadata::extract_metadata`]
//! followed by [`record::apply_to_new_record`], or both at once through
//! [`record::CaptionedImage::create`]. The apply step only ever runs when a
//! record is created; updating an existing record never re-reads the file.
//!
//! Extraction is stateless. Nothing is cached between calls, so streams can
//! be processed from any number of threads; the batch importer does exactly
//! that with rayon.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`iptc`] | IPTC-IIM extraction into named fields (headline, caption, keywords, ...) |
//! | [`exif`] | EXIF extraction, value normalization, per-field formatting, GPS |
//! | [`metadata`] | Combined extraction of both records from one stream |
//! | [`record`] | The captioned image record and the create-time merge rule |
//! | [`imaging`] | Container sniffing and low-level IIM block location |
//! | [`fingerprint`] | SHA-256 content fingerprints for deduplication |
//! | [`naming`] | Storage-safe upload paths for originals |
//! | [`import`] | Parallel batch import of a directory with deduplication |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never Fail on Bad Metadata
//!
//! Real-world files carry truncated, mis-encoded, or vendor-specific
//! metadata. A missing or malformed block yields an empty record and a log
//! line (`tracing`), never an error. The only failure surfaced to callers is
//! an I/O error on the stream itself while reading EXIF.
//!
//! ## Typed Raw Values
//!
//! EXIF values arrive in many storage shapes (rationals, byte strings,
//! tuples, the nested GPS directory). They are decoded into a single
//! [`exif::RawValue`] sum type with one coercion per variant, and formatting
//! rules only apply when a value has the shape they expect.
//!
//! ## In-Tree IIM Parsing
//!
//! EXIF decoding is delegated to `kamadak-exif`. IPTC-IIM is a small
//! format, so it is parsed in-tree from the JPEG APP13 Photoshop resource or
//! the TIFF IPTC tag, without an image decoder.

pub mod config;
pub mod exif;
pub mod fingerprint;
pub mod imaging;
pub mod import;
pub mod iptc;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod record;

#[cfg(test)]
pub(crate) mod test_helpers;
