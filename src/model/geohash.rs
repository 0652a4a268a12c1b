use thiserror::Error;

/// The base-32 alphabet used by geohashes. Note the missing `a`, `i`, `l`
/// and `o`.
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision at which incident locations are indexed. Nine characters puts
/// the cell error below ~2.4 m of latitude, enough for proximity queries.
pub const CELL_PRECISION: usize = 9;

/// A character that is not part of the geohash alphabet.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid geohash character {0:?}")]
pub struct InvalidGeohash(pub char);

/// The cell a geohash denotes: its center point and half-widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Latitude of the cell center.
    pub latitude: f64,
    /// Longitude of the cell center.
    pub longitude: f64,
    /// Half the latitude span of the cell.
    pub latitude_error: f64,
    /// Half the longitude span of the cell.
    pub longitude_error: f64,
}

/// Encode a coordinate pair into a geohash of `length` characters.
///
/// Bits alternate between longitude and latitude, longitude first; each
/// group of five selects one alphabet character. Inputs must be within
/// the valid coordinate ranges.
pub fn encode(latitude: f64, longitude: f64, length: usize) -> String {
    let mut lat_range = (-90.0f64, 90.0f64);
    let mut lon_range = (-180.0f64, 180.0f64);
    let mut even_bit = true;
    let mut index = 0usize;
    let mut bits = 0u8;
    let mut hash = String::with_capacity(length);

    while hash.len() < length {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if longitude >= mid {
                index = index * 2 + 1;
                lon_range.0 = mid;
            } else {
                index *= 2;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if latitude >= mid {
                index = index * 2 + 1;
                lat_range.0 = mid;
            } else {
                index *= 2;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[index] as char);
            bits = 0;
            index = 0;
        }
    }

    hash
}

/// Decode a geohash back to the cell it denotes.
pub fn decode(hash: &str) -> core::result::Result<Cell, InvalidGeohash> {
    let mut lat_range = (-90.0f64, 90.0f64);
    let mut lon_range = (-180.0f64, 180.0f64);
    let mut even_bit = true;

    for c in hash.chars() {
        let index = BASE32
            .iter()
            .position(|b| *b as char == c.to_ascii_lowercase())
            .ok_or(InvalidGeohash(c))?;

        for shift in (0..5).rev() {
            let bit = (index >> shift) & 1;
            let range = if even_bit {
                &mut lon_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if bit == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
    }

    Ok(Cell {
        latitude: (lat_range.0 + lat_range.1) / 2.0,
        longitude: (lon_range.0 + lon_range.1) / 2.0,
        latitude_error: (lat_range.1 - lat_range.0) / 2.0,
        longitude_error: (lon_range.1 - lon_range.0) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash() {
        // Reference vector from the public geohash test suite.
        assert_eq!(encode(57.64911, 10.40744, CELL_PRECISION), "u4pruydqq");
        assert_eq!(encode(57.64911, 10.40744, 11), "u4pruydqqvj");
    }

    #[test]
    fn test_known_cell_roundtrip() {
        let cell = decode("ezs42").unwrap();
        assert!((cell.latitude - 42.605).abs() < cell.latitude_error + 0.001);
        assert!((cell.longitude - -5.603).abs() < cell.longitude_error + 0.001);
        assert_eq!(
            encode(cell.latitude, cell.longitude, 5),
            "ezs42"
        );
    }

    #[test]
    fn test_encode_decode_within_cell_tolerance() {
        // Deterministic sweep over both hemispheres, including the poles and
        // the antimeridian edge.
        let latitudes = [-90.0, -45.5, -6.9, 0.0, 6.9, 37.0, 57.64911, 89.9];
        let longitudes = [-179.9, -73.0, -5.603, 0.0, 10.40744, 80.8, 179.9];

        for &lat in &latitudes {
            for &lon in &longitudes {
                let hash = encode(lat, lon, CELL_PRECISION);
                assert_eq!(hash.len(), CELL_PRECISION);

                let cell = decode(&hash).unwrap();
                assert!(
                    (cell.latitude - lat).abs() <= cell.latitude_error,
                    "latitude drifted outside the cell for ({lat}, {lon})"
                );
                assert!(
                    (cell.longitude - lon).abs() <= cell.longitude_error,
                    "longitude drifted outside the cell for ({lat}, {lon})"
                );
            }
        }
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        assert_eq!(decode("u4pruydqa"), Err(InvalidGeohash('a')));
        assert_eq!(decode("u4!"), Err(InvalidGeohash('!')));
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode("EZS42"), decode("ezs42"));
    }
}
