//! Per-field formatting of EXIF values into display strings.
//!
//! | Field | Output |
//! |---|---|
//! | `DateTime`, `DateTimeOriginal`, `DateTimeDigitized` | timestamp |
//! | `FNumber` | `f1.8` |
//! | `MaxApertureValue` | `f1.7` (one decimal) |
//! | `FocalLength`, `FocalLengthIn35mmFilm` | `35.0mm`, `52mm` |
//! | `Orientation`, `ResolutionUnit`, `ExposureProgram`, `MeteringMode` | table name |
//! | `XResolution`, `YResolution` | integer |
//! | `ExposureTime` | `1/1000` |
//! | `ExposureBiasValue` | `-0.5 EV` |
//!
//! A formatter only applies when the raw value has the shape it expects;
//! otherwise the caller falls back to generic coercion.

use super::lookups::{EXPOSURE_PROGRAMS, METERING_MODES, ORIENTATIONS, RESOLUTION_UNITS, lookup};
use super::raw::{Ratio, RawValue};
use super::value::ExifValue;
use chrono::NaiveDateTime;
use exif::Tag;

const DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Largest denominator used when rendering exposure times as fractions.
pub const MAX_EXPOSURE_DENOMINATOR: i64 = 8000;

/// Shortest decimal form that reads back to the same float, always with a
/// fractional part (`4.0`, `1.8`, `0.001`).
pub fn float_repr(v: f64) -> String {
    format!("{v:?}")
}

/// Apply the field-specific rule for `tag`, if it has one.
pub fn format_tag(tag: Tag, raw: &RawValue) -> Option<ExifValue> {
    match tag {
        Tag::DateTime | Tag::DateTimeOriginal | Tag::DateTimeDigitized => raw
            .as_text()
            .and_then(parse_datetime)
            .map(ExifValue::DateTime),
        Tag::FNumber => raw
            .as_f64()
            .map(|v| ExifValue::Text(format!("f{}", float_repr(v)))),
        Tag::MaxApertureValue => raw.as_f64().map(|v| ExifValue::Text(format!("f{v:.1}"))),
        Tag::FocalLength => raw
            .as_f64()
            .map(|v| ExifValue::Text(format!("{}mm", float_repr(v)))),
        Tag::FocalLengthIn35mmFilm => raw.as_int().map(|n| ExifValue::Text(format!("{n}mm"))),
        Tag::Orientation => enumerated(&ORIENTATIONS, raw),
        Tag::ResolutionUnit => enumerated(&RESOLUTION_UNITS, raw),
        Tag::ExposureProgram => enumerated(&EXPOSURE_PROGRAMS, raw),
        Tag::MeteringMode => enumerated(&METERING_MODES, raw),
        Tag::XResolution | Tag::YResolution => raw
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| ExifValue::Int(v.trunc() as i64)),
        Tag::ExposureTime => raw
            .as_ratio()
            .and_then(|r| limit_denominator(r, MAX_EXPOSURE_DENOMINATOR))
            .map(|r| ExifValue::Text(format_fraction(r))),
        Tag::ExposureBiasValue => raw
            .as_f64()
            .map(|v| ExifValue::Text(format!("{} EV", float_repr(v)))),
        _ => None,
    }
}

fn enumerated(table: &[&'static str], raw: &RawValue) -> Option<ExifValue> {
    raw.as_int()
        .and_then(|i| lookup(table, i))
        .map(|name| ExifValue::Text(name.to_string()))
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim_end_matches('\0').trim(), DATE_FORMAT).ok()
}

/// `num/den`, or just `num` for whole numbers.
fn format_fraction(r: Ratio) -> String {
    if r.den == 1 {
        r.num.to_string()
    } else {
        format!("{}/{}", r.num, r.den)
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

/// Closest fraction to `r` whose denominator is at most `max_den`, in
/// lowest terms. `None` for a zero denominator.
///
/// Walks the continued-fraction convergents of `r` and picks between the
/// last convergent and the best semiconvergent under the bound.
pub fn limit_denominator(r: Ratio, max_den: i64) -> Option<Ratio> {
    if r.den == 0 || max_den < 1 {
        return None;
    }
    let (mut num, mut den) = (i128::from(r.num), i128::from(r.den));
    if den < 0 {
        (num, den) = (-num, -den);
    }
    let g = gcd(num, den).max(1);
    (num, den) = (num / g, den / g);

    let max = i128::from(max_den);
    if den <= max {
        return to_ratio(num, den);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0i128, 1i128, 1i128, 0i128);
    let (mut n, mut d) = (num, den);
    loop {
        let a = n.div_euclid(d);
        let q2 = q0 + a * q1;
        if q2 > max {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
    }

    let k = (max - q0) / q1;
    let (semi_num, semi_den) = (p0 + k * p1, q0 + k * q1);
    // Compare |p1/q1 - x| against |semi - x| without division
    let convergent_err = (p1 * den - num * q1).abs() * semi_den;
    let semi_err = (semi_num * den - num * semi_den).abs() * q1;
    if convergent_err <= semi_err {
        to_ratio(p1, q1)
    } else {
        to_ratio(semi_num, semi_den)
    }
}

fn to_ratio(num: i128, den: i128) -> Option<Ratio> {
    Some(Ratio::new(i64::try_from(num).ok()?, i64::try_from(den).ok()?))
}
