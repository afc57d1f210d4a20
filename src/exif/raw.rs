//! Raw tag values as decoded from the EXIF block, before interpretation.

use super::format::float_repr;
use super::value::ExifValue;
use std::collections::BTreeMap;
use std::fmt;

/// Values whose display form is longer than this are cut down before any
/// further processing.
pub const MAX_DISPLAY_LEN: usize = 64;

/// Exact fraction, signed so both RATIONAL and SRATIONAL fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl Ratio {
    pub fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Floating-point value. A zero denominator gives NaN or infinity.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// A single decoded EXIF value, one variant per storage shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Rational(Ratio),
    Text(String),
    Bytes(Vec<u8>),
    Tuple(Vec<RawValue>),
    /// A nested directory keyed by tag number (the GPS block).
    Dict(BTreeMap<u16, RawValue>),
}

/// Single values stay scalar, several become a tuple, none is no value.
fn collect<T>(items: &[T], f: impl Fn(&T) -> RawValue) -> Option<RawValue> {
    match items {
        [] => None,
        [one] => Some(f(one)),
        many => Some(RawValue::Tuple(many.iter().map(f).collect())),
    }
}

impl RawValue {
    /// Convert a `kamadak-exif` value. Unknown field types yield `None`.
    pub fn from_exif(value: &exif::Value) -> Option<RawValue> {
        use exif::Value;

        match value {
            Value::Byte(bytes) => Some(RawValue::Bytes(bytes.clone())),
            Value::Undefined(bytes, _) => Some(RawValue::Bytes(bytes.clone())),
            Value::Ascii(parts) => collect(parts, |p| {
                RawValue::Text(String::from_utf8_lossy(p).into_owned())
            }),
            Value::Short(v) => collect(v, |n| RawValue::Int(i64::from(*n))),
            Value::Long(v) => collect(v, |n| RawValue::Int(i64::from(*n))),
            Value::SByte(v) => collect(v, |n| RawValue::Int(i64::from(*n))),
            Value::SShort(v) => collect(v, |n| RawValue::Int(i64::from(*n))),
            Value::SLong(v) => collect(v, |n| RawValue::Int(i64::from(*n))),
            Value::Rational(v) => collect(v, |r| {
                RawValue::Rational(Ratio::new(i64::from(r.num), i64::from(r.denom)))
            }),
            Value::SRational(v) => collect(v, |r| {
                RawValue::Rational(Ratio::new(i64::from(r.num), i64::from(r.denom)))
            }),
            Value::Float(v) => collect(v, |f| RawValue::Float(f64::from(*f))),
            Value::Double(v) => collect(v, |f| RawValue::Float(*f)),
            _ => None,
        }
    }

    /// Replace values with an oversized display form by their first 65
    /// characters followed by `...`.
    pub fn guarded(self) -> RawValue {
        let shown = self.to_string();
        if shown.chars().count() > MAX_DISPLAY_LEN {
            let mut cut: String = shown.chars().take(MAX_DISPLAY_LEN + 1).collect();
            cut.push_str("...");
            RawValue::Text(cut)
        } else {
            self
        }
    }

    /// Generic coercion into a processed value.
    pub fn coerce(&self) -> ExifValue {
        match self {
            RawValue::Int(n) => ExifValue::Int(*n),
            RawValue::Float(f) => ExifValue::Float(*f),
            RawValue::Rational(r) => ExifValue::Float(r.to_f64()),
            RawValue::Text(s) => ExifValue::Text(s.trim_end_matches('\0').to_string()),
            RawValue::Bytes(b) => {
                ExifValue::Text(String::from_utf8_lossy(b).trim_end_matches('\0').to_string())
            }
            RawValue::Tuple(items) => ExifValue::List(items.iter().map(RawValue::coerce).collect()),
            RawValue::Dict(entries) => ExifValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.coerce()))
                    .collect(),
            ),
        }
    }

    pub fn as_ratio(&self) -> Option<Ratio> {
        match self {
            RawValue::Rational(r) => Some(*r),
            RawValue::Int(n) => Some(Ratio::new(*n, 1)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Rational(r) => Some(r.to_f64()),
            RawValue::Float(f) => Some(*f),
            RawValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(n) => write!(f, "{n}"),
            RawValue::Float(v) => f.write_str(&float_repr(*v)),
            RawValue::Rational(r) => f.write_str(&float_repr(r.to_f64())),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            RawValue::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            RawValue::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
