//! GPS degree/minute/second triples to decimal degrees.

use super::raw::RawValue;
use serde::Serialize;
use std::collections::BTreeMap;

// GPS IFD tag numbers
const LATITUDE_REF: u16 = 1;
const LATITUDE: u16 = 2;
const LONGITUDE_REF: u16 = 3;
const LONGITUDE: u16 = 4;

/// Decimal-degree position. Both parts are absent when the image carries
/// no usable GPS block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpsCoordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GpsCoordinate {
    /// Resolve a position from the GPS block, keyed by GPS tag number.
    ///
    /// Needs both references and both triples. Latitude is negated unless
    /// its reference is `N`, longitude unless its reference is `E`.
    pub fn from_gps_block(block: &BTreeMap<u16, RawValue>) -> GpsCoordinate {
        let resolve = || -> Option<(f64, f64)> {
            let lat = to_degrees(&dms(block.get(&LATITUDE)?)?)?;
            let lat_ref = block.get(&LATITUDE_REF)?.as_text();
            let lon = to_degrees(&dms(block.get(&LONGITUDE)?)?)?;
            let lon_ref = block.get(&LONGITUDE_REF)?.as_text();

            let lat = if lat_ref == Some("N") { lat } else { -lat };
            let lon = if lon_ref == Some("E") { lon } else { -lon };
            Some((lat, lon))
        };

        match resolve() {
            Some((lat, lon)) => GpsCoordinate {
                latitude: Some(lat),
                longitude: Some(lon),
            },
            None => GpsCoordinate::default(),
        }
    }
}

/// The first three numeric components of a coordinate value.
fn dms(value: &RawValue) -> Option<[f64; 3]> {
    let RawValue::Tuple(parts) = value else {
        return None;
    };
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts.get(..3)?) {
        *slot = part.as_f64()?;
    }
    Some(out)
}

/// `d + m/60 + s/3600`, `None` if the result is not finite.
pub fn to_degrees(dms: &[f64; 3]) -> Option<f64> {
    let [d, m, s] = dms;
    Some(d + m / 60.0 + s / 3600.0).filter(|v| v.is_finite())
}
