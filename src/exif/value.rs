use super::format::float_repr;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A processed EXIF value, ready for display or JSON storage.
///
/// Timestamps serialize as ISO-8601 (`2024-03-11T09:30:00`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExifValue {
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
    List(Vec<ExifValue>),
    Map(BTreeMap<String, ExifValue>),
}

impl ExifValue {
    /// Whether the value carries information: non-zero numbers and
    /// non-empty strings, lists and maps.
    pub fn is_truthy(&self) -> bool {
        match self {
            ExifValue::Int(n) => *n != 0,
            ExifValue::Float(f) => *f != 0.0,
            ExifValue::DateTime(_) => true,
            ExifValue::Text(s) => !s.is_empty(),
            ExifValue::List(items) => !items.is_empty(),
            ExifValue::Map(entries) => !entries.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExifValue::Int(n) => Some(*n as f64),
            ExifValue::Float(f) => Some(*f),
            ExifValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExifValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifValue::Int(n) => write!(f, "{n}"),
            ExifValue::Float(v) => f.write_str(&float_repr(*v)),
            ExifValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            ExifValue::Text(s) => f.write_str(s),
            ExifValue::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            ExifValue::Map(entries) => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn truthiness() {
        assert!(!ExifValue::Int(0).is_truthy());
        assert!(!ExifValue::Float(0.0).is_truthy());
        assert!(!ExifValue::Text(String::new()).is_truthy());
        assert!(!ExifValue::List(vec![]).is_truthy());
        assert!(!ExifValue::Map(BTreeMap::new()).is_truthy());
        assert!(ExifValue::Int(-1).is_truthy());
        assert!(ExifValue::Text("0".into()).is_truthy());
    }

    #[test]
    fn datetime_serializes_as_iso() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            serde_json::to_value(ExifValue::DateTime(dt)).unwrap(),
            serde_json::json!("2024-03-11T09:30:00")
        );
        assert_eq!(ExifValue::DateTime(dt).to_string(), "2024-03-11 09:30:00");
    }

    #[test]
    fn untagged_serialization() {
        let value = ExifValue::List(vec![ExifValue::Int(400), ExifValue::Float(2.5)]);
        assert_eq!(
            serde_json::to_value(value).unwrap(),
            serde_json::json!([400, 2.5])
        );
    }

    #[test]
    fn numeric_reading() {
        assert_eq!(ExifValue::Float(4.0).as_f64(), Some(4.0));
        assert_eq!(ExifValue::Int(4).as_f64(), Some(4.0));
        assert_eq!(ExifValue::Text(" 2.8 ".into()).as_f64(), Some(2.8));
        assert_eq!(ExifValue::Text("wide".into()).as_f64(), None);
    }
}
