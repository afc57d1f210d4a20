//! CLI output formatting for `inspect` and `import`.
//!
//! # Information-First Display
//!
//! Each image leads with its identity (positional index and title), with
//! file paths and metadata shown as indented context lines. Empty fields are
//! left out, so the output reads as an inventory of what the image carries.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! 001 Harbour at dusk
//!     Source: photos/harbour.jpg
//!     Caption: Boats returning at dusk
//!     Credit: Reuters
//!     Camera: Canon EOS R5
//!     Exposure: 1/250 f/4.00 400ISO
//!     Location: 59.9139, 10.7522
//!     IPTC
//!         headline: Harbour at dusk
//!         keywords: harbour, dusk
//!     EXIF
//!         Make: Canon
//!         Model: EOS R5
//! ```
//!
//! ## Import
//!
//! ```text
//! 001 Harbour at dusk
//!     Source: harbour.jpg
//!     Upload: original_images/harbour.jpg
//!     Hash: 3f2a9c01b7e4
//!
//! Duplicates
//!     copy/harbour.jpg → harbour.jpg
//!
//! Imported 1 image, 1 duplicate skipped
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::import::ImportManifest;
use crate::iptc::IptcValue;
use crate::record::CaptionedImage;
use std::path::Path;

/// Characters of a caption shown before it is cut off.
const CAPTION_PREVIEW_CHARS: usize = 60;

/// Hex digits of a file hash shown in listings.
const HASH_PREVIEW_CHARS: usize = 12;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// `label: value` at the given depth, or nothing for an empty value.
fn field_line(depth: usize, label: &str, value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| format!("{}{label}: {value}", indent(depth)))
}

/// Join the non-empty parts with a space.
fn joined(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn iptc_value(value: &IptcValue) -> String {
    match value {
        IptcValue::Text(s) => s.clone(),
        IptcValue::List(items) => items.join(", "),
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Format one inspected image: record fields, then the raw IPTC and EXIF
/// records.
pub fn format_inspect_output(index: usize, source: &Path, image: &CaptionedImage) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), image.title)];
    lines.push(format!("{}Source: {}", indent(1), source.display()));

    let caption = image
        .caption
        .as_deref()
        .map(|c| truncate_desc(&strip_html_tags(c).replace('\n', " "), CAPTION_PREVIEW_CHARS))
        .unwrap_or_default();
    lines.extend(
        [
            ("Alt", image.alt.as_str()),
            ("Caption", caption.as_str()),
            ("Credit", image.credit.as_str()),
            ("Byline", image.byline.as_str()),
            ("Usage terms", image.usage_terms.as_str()),
            ("Copyright", image.copyright_notice.as_str()),
        ]
        .into_iter()
        .filter_map(|(label, value)| field_line(1, label, value)),
    );

    if let Some(exif) = &image.exif {
        let camera = joined(&[exif.camera_make.as_str(), exif.camera_model.as_str()]);
        let lens = joined(&[exif.lens_make.as_str(), exif.lens_model.as_str()]);
        let exposure = joined(&[
            exif.shutter_speed.as_str(),
            exif.aperture.as_str(),
            exif.iso_rating.as_str(),
        ]);
        let taken = exif
            .date_time_original
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let location = match (exif.latitude, exif.longitude) {
            (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
            _ => String::new(),
        };
        lines.extend(
            [
                ("Camera", camera.as_str()),
                ("Lens", lens.as_str()),
                ("Focal length", exif.focal_length.as_str()),
                ("Exposure", exposure.as_str()),
                ("Taken", taken.as_str()),
                ("Location", location.as_str()),
            ]
            .into_iter()
            .filter_map(|(label, value)| field_line(1, label, value)),
        );
    }

    if !image.iptc_data.is_empty() {
        lines.push(format!("{}IPTC", indent(1)));
        for (field, value) in image.iptc_data.iter() {
            lines.push(format!("{}{}: {}", indent(2), field.as_str(), iptc_value(value)));
        }
    }

    if let Some(exif) = image.exif.as_ref().filter(|e| !e.exif_data.is_empty()) {
        lines.push(format!("{}EXIF", indent(1)));
        for (name, value) in exif.exif_data.iter() {
            lines.push(format!("{}{name}: {value}", indent(2)));
        }
    }
    lines
}

pub fn print_inspect_output(index: usize, source: &Path, image: &CaptionedImage) {
    for line in format_inspect_output(index, source, image) {
        println!("{}", line);
    }
}

// ============================================================================
// Import
// ============================================================================

/// Format the result of a batch import. Paths are shown relative to `root`.
pub fn format_import_output(manifest: &ImportManifest, root: &Path) -> Vec<String> {
    let relative = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
    let mut lines = Vec::new();

    for (i, entry) in manifest.images.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.image.title));
        lines.push(format!("{}Source: {}", indent(1), relative(&entry.source)));
        lines.push(format!("{}Upload: {}", indent(1), entry.upload_path));
        let hash: String = entry.file_hash.chars().take(HASH_PREVIEW_CHARS).collect();
        lines.push(format!("{}Hash: {hash}", indent(1)));
    }

    if !manifest.duplicates.is_empty() {
        lines.push(String::new());
        lines.push("Duplicates".to_string());
        for dup in &manifest.duplicates {
            lines.push(format!(
                "{}{} → {}",
                indent(1),
                relative(&dup.source),
                relative(&dup.original)
            ));
        }
    }

    let images = manifest.images.len();
    let dups = manifest.duplicates.len();
    lines.push(String::new());
    lines.push(format!(
        "Imported {images} image{}, {dups} duplicate{} skipped",
        if images == 1 { "" } else { "s" },
        if dups == 1 { "" } else { "s" },
    ));
    lines
}

pub fn print_import_output(manifest: &ImportManifest, root: &Path) {
    for line in format_import_output(manifest, root) {
        println!("{}", line);
    }
}
