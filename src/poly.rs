use std::str::FromStr;

use geo_types::LineString;
use log::debug;
use wkt::ToWkt;

use crate::bounds::{Bbox, Bounds};
use crate::error::MalformedGeometryError;
use crate::point::GeoPoint;


/// Closed ring of vertices describing a zone. The ring is implicitly closed,
/// the first and last vertex need not be equal. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    coordinates: Vec<GeoPoint>,
    bounds: Option<Bbox>,
}

impl Polygon {
    pub fn new(coordinates: Vec<GeoPoint>) -> Result<Self, MalformedGeometryError> {
        if coordinates.len() < 3 {
            return Err(MalformedGeometryError::TooFewPoints(coordinates.len()));
        }
        let bounds = Bbox::from_points(&coordinates);
        Ok(Self { coordinates, bounds })
    }

    pub fn coordinates(&self) -> &[GeoPoint] {
        &self.coordinates
    }

    pub fn bounds(&self) -> Option<Bbox> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Always `false` for a built polygon; pairs with `len`.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Same ring with no cached bounding box, so every containment query runs
    /// the full ray cast.
    pub fn without_bounds(&self) -> Self {
        Self { coordinates: self.coordinates.clone(), bounds: None }
    }

    /// Canonical WKT rendering, longitude first.
    pub fn to_wkt(&self) -> String {
        geo_types::Polygon::from(self).to_wkt().to_string()
    }
}

impl Bounds for Polygon {
    fn contains(&self, p: &GeoPoint) -> bool {
        if let Some(b) = &self.bounds {
            if !b.contains(p) {
                return false;
            }
        }
        ray_cast(&self.coordinates, p)
    }
}

impl FromStr for Polygon {
    type Err = MalformedGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_wkt(s)
    }
}

impl From<&Polygon> for geo_types::Polygon<f64> {
    fn from(p: &Polygon) -> Self {
        let ring: Vec<(f64, f64)> = p.coordinates.iter().map(|c| (c.longitude, c.latitude)).collect();
        geo_types::Polygon::new(LineString::from(ring), vec![])
    }
}

pub fn is_inside(point: &GeoPoint, polygon: &Polygon) -> bool {
    polygon.contains(point)
}

#[inline]
// Ray casting, even-odd rule
// https://en.wikipedia.org/wiki/Point_in_polygon#Ray_casting_algorithm
// x is latitude and y is longitude here, both for the point and the vertices.
pub fn ray_cast(vertices: &[GeoPoint], p: &GeoPoint) -> bool {
    let (x, y) = (p.latitude, p.longitude);
    let mut inside = false;
    let mut j = match vertices.len() {
        0 => return false,
        n => n - 1,
    };
    for (i, vi) in vertices.iter().enumerate() {
        let vj = &vertices[j];
        let (xi, yi) = (vi.latitude, vi.longitude);
        let (xj, yj) = (vj.latitude, vj.longitude);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Parse a `POLYGON ((lng lat, ...))` string. Single `(...)` and double
/// `((...))` rings are both accepted, the keyword is case-insensitive.
pub fn parse_wkt(wkt: &str) -> Result<Polygon, MalformedGeometryError> {
    let ring = strip_ring(wkt);
    if ring.is_empty() {
        return Err(MalformedGeometryError::EmptyRing(wkt.to_string()));
    }
    let coordinates = ring
        .split(',')
        .map(parse_pair)
        .collect::<Result<Vec<GeoPoint>, _>>()?;
    let polygon = Polygon::new(coordinates)?;
    debug!("Parsed zone polygon with {} coordinates, bounds {:?}", polygon.len(), polygon.bounds);
    Ok(polygon)
}

fn strip_ring(wkt: &str) -> &str {
    let mut s = wkt.trim();
    let has_keyword = s.get(..7).map_or(false, |k| k.eq_ignore_ascii_case("POLYGON"));
    if has_keyword {
        if let Some(rest) = s[7..].trim_start().strip_prefix('(') {
            s = rest;
        }
    }
    if let Some(rest) = s.strip_suffix(')') {
        s = rest;
    }
    s = s.trim();
    if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        s = &s[1..s.len() - 1];
    }
    s.trim()
}

fn parse_pair(pair: &str) -> Result<GeoPoint, MalformedGeometryError> {
    let invalid = |reason: &'static str| MalformedGeometryError::InvalidPair {
        pair: pair.trim().to_string(),
        reason,
    };
    let mut fields = pair.split_whitespace();
    let (lng, lat) = match (fields.next(), fields.next(), fields.next()) {
        (Some(lng), Some(lat), None) => (lng, lat),
        _ => return Err(invalid("expected `lng lat`")),
    };
    let longitude = parse_degrees(lng).ok_or_else(|| invalid("longitude is not a number"))?;
    let latitude = parse_degrees(lat).ok_or_else(|| invalid("latitude is not a number"))?;
    Ok(GeoPoint::new(latitude, longitude))
}

fn parse_degrees(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
const LIMA_SQUARE: &str = "POLYGON ((-77.05 -12.05, -77.04 -12.05, -77.04 -12.04, -77.05 -12.04, -77.05 -12.05))";

#[test]
fn parse_test() {
    let p = parse_wkt(LIMA_SQUARE).unwrap();
    assert_eq!(p.len(), 5);
    assert_eq!(p.coordinates()[0], GeoPoint::new(-12.05, -77.05));
    assert_eq!(p.coordinates()[1], GeoPoint::new(-12.05, -77.04));
    assert_eq!(p.coordinates()[2], GeoPoint::new(-12.04, -77.04));
    assert_eq!(p.bounds(), Some(Bbox { min_lat: -12.05, max_lat: -12.04, min_lng: -77.05, max_lng: -77.04 }));

    let single = parse_wkt("POLYGON((-77.05 -12.05, -77.04 -12.05, -77.04 -12.04))").unwrap();
    assert_eq!(single.len(), 3);
    assert!(!single.is_empty());
    let bare = parse_wkt("POLYGON (-77.05 -12.05, -77.04 -12.05, -77.04 -12.04)").unwrap();
    assert_eq!(bare.coordinates(), single.coordinates());

    let lower = "polygon ( ( 1 2 ,  3 4,5 6 ) )".parse::<Polygon>().unwrap();
    assert_eq!(lower.coordinates(), &[GeoPoint::new(2.0, 1.0), GeoPoint::new(4.0, 3.0), GeoPoint::new(6.0, 5.0)]);
}

#[test]
fn parse_keeps_order_and_swaps_axes() {
    let pairs: Vec<(f64, f64)> = (0..12)
        .map(|i| {
            let a = i as f64 * std::f64::consts::PI / 6.0;
            (10.0 + a.cos(), 50.0 + 0.5 * a.sin())
        })
        .collect();
    let body: Vec<String> = pairs.iter().map(|(lng, lat)| format!("{} {}", lng, lat)).collect();
    let p = parse_wkt(&format!("POLYGON (({}))", body.join(", "))).unwrap();
    assert_eq!(p.len(), pairs.len());
    for (v, (lng, lat)) in p.coordinates().iter().zip(&pairs) {
        assert_eq!(v.longitude, *lng);
        assert_eq!(v.latitude, *lat);
    }
    let b = p.bounds().unwrap();
    assert!(b.min_lat <= b.max_lat && b.min_lng <= b.max_lng);
    assert!(p.coordinates().iter().all(|v| b.contains(v)));
}

#[test]
fn parse_rejects_malformed() {
    assert!(matches!(
        parse_wkt("POLYGON ((1 2, abc 3))"),
        Err(MalformedGeometryError::InvalidPair { ref pair, .. }) if pair == "abc 3"
    ));
    assert!(matches!(parse_wkt("POLYGON (())"), Err(MalformedGeometryError::EmptyRing(_))));
    assert!(matches!(parse_wkt(""), Err(MalformedGeometryError::EmptyRing(_))));
    assert!(matches!(parse_wkt("POLYGON ((1 2, 3 4))"), Err(MalformedGeometryError::TooFewPoints(2))));
    assert!(matches!(parse_wkt("POLYGON ((1 2 3, 3 4, 5 6))"), Err(MalformedGeometryError::InvalidPair { .. })));
    assert!(matches!(parse_wkt("POLYGON ((1, 3 4, 5 6))"), Err(MalformedGeometryError::InvalidPair { .. })));
    assert!(matches!(parse_wkt("POLYGON ((1 2, 3 4, 5 6,))"), Err(MalformedGeometryError::InvalidPair { .. })));
    assert!(matches!(parse_wkt("POLYGON ((NaN 2, 3 4, 5 6))"), Err(MalformedGeometryError::InvalidPair { .. })));
    assert!(matches!(parse_wkt("POLYGON ((1 inf, 3 4, 5 6))"), Err(MalformedGeometryError::InvalidPair { .. })));
}

#[test]
fn parse_agrees_with_wkt_crate() {
    use wkt::TryFromWkt;
    let denmark = "POLYGON ((7.87 54.69, 7.78 57.25, 9.63 58.08, 10.71 58.11, 12.05 56.69, 13.15 56.42, 14.2 55.47, 15.5 55.33, 15.28 54.64, 12.98 54.94, 12.29 54.35, 12.46 53.64, 11.41 53.42, 10.07 53.18, 8.78 53.52, 7.87 54.69))";
    let ours = parse_wkt(denmark).unwrap();
    let theirs: geo_types::Polygon<f64> = geo_types::Polygon::try_from_wkt_str(denmark).unwrap();
    let cs: Vec<GeoPoint> = theirs.exterior().coords().map(|c| GeoPoint::new(c.y, c.x)).collect();
    assert_eq!(ours.coordinates(), cs.as_slice());
    assert!(ours.contains(&GeoPoint::new(56.0, 10.0)));
    assert!(!ours.contains(&GeoPoint::new(10.0, 56.0)));
}

#[test]
fn to_wkt_reparses() {
    let p = parse_wkt("POLYGON((-77.05 -12.05, -77.04 -12.05, -77.04 -12.04))").unwrap();
    let again = parse_wkt(&p.to_wkt()).unwrap();
    // geo-types closes the ring with a repeat of the first vertex
    assert_eq!(again.len(), 4);
    assert_eq!(&again.coordinates()[..3], p.coordinates());
    assert_eq!(again.coordinates()[3], p.coordinates()[0]);
    let probe = GeoPoint::new(-12.047, -77.042);
    assert_eq!(again.contains(&probe), p.contains(&probe));
}

#[test]
fn contains_square() {
    let p = parse_wkt(LIMA_SQUARE).unwrap();
    assert!(is_inside(&GeoPoint::new(-12.045, -77.045), &p));
    assert!(!is_inside(&GeoPoint::new(-12.10, -77.045), &p));
    assert!(!is_inside(&GeoPoint::new(-12.045, -77.10), &p));
}

#[test]
fn contains_pins_axes() {
    // wide in longitude, thin in latitude: swapping lat/lng flips the answers
    let p = parse_wkt("POLYGON ((10 0, 20 0, 20 1, 10 1))").unwrap();
    assert!(p.contains(&GeoPoint::new(0.5, 15.0)));
    assert!(!p.contains(&GeoPoint::new(15.0, 0.5)));
    assert!(ray_cast(p.coordinates(), &GeoPoint::new(0.5, 15.0)));
    assert!(!ray_cast(p.coordinates(), &GeoPoint::new(15.0, 0.5)));
}

#[test]
fn contains_concave() {
    // U shape opening north, the notch is outside
    let p = parse_wkt("POLYGON ((0 0, 3 0, 3 3, 2 3, 2 1, 1 1, 1 3, 0 3))").unwrap();
    assert!(p.contains(&GeoPoint::new(0.5, 1.5)));
    assert!(p.contains(&GeoPoint::new(2.0, 0.5)));
    assert!(p.contains(&GeoPoint::new(2.0, 2.5)));
    assert!(!p.contains(&GeoPoint::new(2.0, 1.5)));
}

#[test]
fn contains_ignores_winding() {
    let p = parse_wkt("POLYGON ((0 0, 4 0, 4 1, 2 3, 0 1))").unwrap();
    let mut rev = p.coordinates().to_vec();
    rev.reverse();
    let r = Polygon::new(rev).unwrap();
    for i in -10..=50 {
        for k in -10..=50 {
            let q = GeoPoint::new(i as f64 * 0.1 + 0.013, k as f64 * 0.1 + 0.017);
            assert_eq!(p.contains(&q), r.contains(&q), "{:?}", q);
        }
    }
}

#[test]
fn bbox_fast_path_is_sound() {
    let p = parse_wkt("POLYGON ((0 0, 3 0, 3 3, 2 3, 2 1, 1 1, 1 3, 0 3))").unwrap();
    let bare = p.without_bounds();
    assert_eq!(bare.bounds(), None);
    let b = p.bounds().unwrap();
    for i in -20..=50 {
        for k in -20..=50 {
            let q = GeoPoint::new(i as f64 * 0.1 + 0.011, k as f64 * 0.1 + 0.019);
            assert_eq!(p.contains(&q), bare.contains(&q), "{:?}", q);
            if !b.contains(&q) {
                assert!(!p.contains(&q));
            }
        }
    }
}

#[test]
fn repeated_vertex_never_toggles() {
    let p = parse_wkt("POLYGON ((0 0, 1 0, 1 0, 1 1, 0 1, 0 1))").unwrap();
    assert!(p.contains(&GeoPoint::new(0.5, 0.5)));
    assert!(!p.contains(&GeoPoint::new(1.5, 0.5)));
}
