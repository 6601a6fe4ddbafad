//! Polyline representation and codec for route geometries.
//!
//! Routes arrive from the directions provider as compact encoded strings
//! (5-bit chunks over an ASCII alphabet offset by 63, zigzag-signed deltas
//! scaled by 1e5). This module decodes them into coordinate sequences for
//! display and encodes sequences back for anything shipped onward.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// A polyline representing a route geometry as decoded coordinates.
///
/// Stores latitude/longitude points directly for internal processing;
/// the compact encoded form only exists at the provider boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    /// An empty polyline (no geometry).
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Decodes an encoded polyline string into a coordinate sequence.
    ///
    /// An empty input yields an empty polyline. A truncated chunk sequence
    /// asserts: the input always originates from a validated route response,
    /// so a malformed string is a provider-contract violation, not a
    /// recoverable condition.
    pub fn decode(encoded: &str) -> Self {
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;
        let mut index = 0;

        while index < bytes.len() {
            let (delta_lat, next) = decode_chunk(bytes, index);
            let (delta_lng, next) = decode_chunk(bytes, next);
            lat += delta_lat;
            lng += delta_lng;
            points.push(LatLng::new(lat as f64 / 1e5, lng as f64 / 1e5));
            index = next;
        }

        Self { points }
    }

    /// Encodes the coordinate sequence back into the compact string form.
    ///
    /// Coordinates are rounded to 5 decimal places, the precision the
    /// encoding carries.
    pub fn encode(&self) -> String {
        let mut encoded = String::new();
        let mut prev_lat: i64 = 0;
        let mut prev_lng: i64 = 0;

        for point in &self.points {
            let lat = (point.lat * 1e5).round() as i64;
            let lng = (point.lng * 1e5).round() as i64;
            encode_value(lat - prev_lat, &mut encoded);
            encode_value(lng - prev_lng, &mut encoded);
            prev_lat = lat;
            prev_lng = lng;
        }

        encoded
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LatLng> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Reads one variable-length value starting at `index`, returning the
/// decoded signed delta and the index past the last consumed byte.
fn decode_chunk(bytes: &[u8], mut index: usize) -> (i64, usize) {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        assert!(index < bytes.len(), "truncated polyline chunk");
        let byte = bytes[index] as i64 - 63;
        index += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;
        if byte < 0x20 {
            break;
        }
    }

    let delta = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    (delta, index)
}

fn encode_value(value: i64, out: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        out.push(((0x20 | (value & 0x1f)) + 63) as u8 as char);
        value >>= 5;
    }
    out.push((value + 63) as u8 as char);
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    // Reference vector from the standard polyline algorithm description.
    const REFERENCE_ENCODED: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<LatLng> {
        vec![
            LatLng::new(38.5, -120.2),
            LatLng::new(40.7, -120.95),
            LatLng::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_decode_reference_vector() {
        let polyline = Polyline::decode(REFERENCE_ENCODED);
        assert_eq!(polyline.points(), &reference_points()[..]);
    }

    #[test]
    fn test_encode_reference_vector() {
        let polyline = Polyline::new(reference_points());
        assert_eq!(polyline.encode(), REFERENCE_ENCODED);
    }

    #[test]
    fn test_decode_empty_string() {
        let polyline = Polyline::decode("");
        assert!(polyline.is_empty());
    }

    #[test]
    fn test_decode_single_point() {
        let encoded = Polyline::new(vec![LatLng::new(56.15720, 10.21070)]).encode();
        let polyline = Polyline::decode(&encoded);
        assert_eq!(polyline.len(), 1);
        assert_eq!(polyline.points()[0], LatLng::new(56.1572, 10.2107));
    }

    #[test]
    #[should_panic(expected = "truncated polyline chunk")]
    fn test_decode_truncated_input_panics() {
        // A continuation byte with nothing after it.
        Polyline::decode("_");
    }

    #[test]
    fn test_new_and_points() {
        let points = reference_points();
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
    }

    #[test]
    fn test_into_points() {
        let points = vec![LatLng::new(38.5, -120.2), LatLng::new(40.7, -120.95)];
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.into_points(), points);
    }

    #[test]
    fn test_empty_polyline() {
        assert!(Polyline::empty().points().is_empty());
    }

    proptest! {
        #[test]
        fn round_trip_preserves_points(
            raw in prop::collection::vec((-90_000_00i64..=90_000_00, -180_000_00i64..=180_000_00), 0..32)
        ) {
            // Work from 1e5-scaled integers so inputs are exactly
            // representable at the encoding's precision.
            let points: Vec<LatLng> = raw
                .iter()
                .map(|&(lat, lng)| LatLng::new(lat as f64 / 1e5, lng as f64 / 1e5))
                .collect();
            let encoded = Polyline::new(points.clone()).encode();
            let decoded = Polyline::decode(&encoded);
            prop_assert_eq!(decoded.into_points(), points);
        }
    }
}
