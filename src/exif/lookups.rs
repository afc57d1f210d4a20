//! Display names for enumerated EXIF fields, indexed by the stored value.

pub static ORIENTATIONS: [&str; 9] = [
    "",
    "Horizontal",
    "Mirror horizontal",
    "Rotate 180",
    "Mirror vertical",
    "Mirror horizontal and rotate 270 CW",
    "Rotate 90 CW",
    "Mirror horizontal and rotate 90 CW",
    "Rotate 270 CW",
];

pub static RESOLUTION_UNITS: [&str; 4] = ["", "Undefined", "Inches", "Centimetres"];

pub static EXPOSURE_PROGRAMS: [&str; 10] = [
    "Undefined",
    "Manual",
    "Program AE",
    "Aperture-priority AE",
    "Shutter speed priority AE",
    "Creative (Slow speed)",
    "Action (High speed)",
    "Portrait ",
    "Landscape",
    "Bulb",
];

pub static METERING_MODES: [&str; 7] = [
    "Undefined",
    "Average",
    "Center-weighted average",
    "Spot",
    "Multi-spot",
    "Multi-segment",
    "Partial",
];

/// Name at `index`, `None` for negative or out-of-range indices.
pub fn lookup(table: &[&'static str], index: i64) -> Option<&'static str> {
    usize::try_from(index).ok().and_then(|i| table.get(i).copied())
}
