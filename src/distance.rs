use crate::bounds::Bounds;
use crate::point::GeoPoint;
use crate::poly::Polygon;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers (Haversine).
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push h past 1 for antipodal points
    let h = h.min(1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Closest polygon vertex to `point`. On ties the earliest vertex wins.
pub fn nearest_vertex(point: &GeoPoint, polygon: &Polygon) -> GeoPoint {
    let vertices = polygon.coordinates();
    let mut closest = vertices[0];
    let mut min = distance_km(point, &closest);
    for v in &vertices[1..] {
        let d = distance_km(point, v);
        if d < min {
            min = d;
            closest = *v;
        }
    }
    closest
}

/// Distance to the nearest vertex, negative when `point` is inside the polygon.
///
/// This measures to vertices, not edges, so it overestimates the gap to a long
/// edge. Good enough for grading an alert, not for surveying a boundary.
pub fn signed_distance_km(point: &GeoPoint, polygon: &Polygon) -> f64 {
    let d = distance_km(point, &nearest_vertex(point, polygon));
    if polygon.contains(point) {
        -d
    } else {
        d
    }
}

#[cfg(test)]
fn square() -> Polygon {
    crate::poly::parse_wkt("POLYGON ((-77.05 -12.05, -77.04 -12.05, -77.04 -12.04, -77.05 -12.04, -77.05 -12.05))").unwrap()
}

#[test]
fn distance_test() {
    let a = GeoPoint::new(-12.05, -77.05);
    assert_eq!(distance_km(&a, &a), 0.0);

    let one_degree = distance_km(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0));
    assert!((one_degree - 111.19492664455873).abs() < 1e-9);

    // Lima to Cusco, roughly 572 km
    let lima = GeoPoint::new(-12.0464, -77.0428);
    let cusco = GeoPoint::new(-13.5320, -71.9675);
    let d = distance_km(&lima, &cusco);
    assert!(d > 565.0 && d < 580.0, "{}", d);
}

#[test]
fn antipodal_distance_is_finite() {
    let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
    let d = distance_km(&GeoPoint::new(-30.75, 0.0), &GeoPoint::new(30.75, 180.0));
    assert!((d - half_circumference).abs() < 1e-6, "{}", d);
    for i in 0..=180 {
        let lat = i as f64 * 0.5 - 45.0;
        let d = distance_km(&GeoPoint::new(lat, 0.0), &GeoPoint::new(-lat, 180.0));
        assert!(d.is_finite() && d <= half_circumference + 1e-6, "{} {}", lat, d);
    }
}

#[test]
fn distance_is_symmetric() {
    let pts: Vec<GeoPoint> = (-4..=4)
        .flat_map(|i| (-4..=4).map(move |k| GeoPoint::new(i as f64 * 20.0 + 0.3, k as f64 * 40.0 - 0.7)))
        .collect();
    for a in &pts {
        assert_eq!(distance_km(a, a), 0.0);
        for b in &pts {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }
}

#[test]
fn nearest_vertex_test() {
    let p = square();
    assert_eq!(nearest_vertex(&GeoPoint::new(-12.039, -77.039), &p), GeoPoint::new(-12.04, -77.04));
    assert_eq!(nearest_vertex(&GeoPoint::new(-12.10, -77.06), &p), GeoPoint::new(-12.05, -77.05));
    // the closing vertex repeats the first one; the first occurrence is returned
    let c = GeoPoint::new(-12.05, -77.05);
    assert_eq!(nearest_vertex(&c, &p), p.coordinates()[0]);
}

#[test]
fn signed_distance_test() {
    let p = square();
    let inside = GeoPoint::new(-12.045, -77.045);
    let outside = GeoPoint::new(-12.10, -77.045);
    let di = signed_distance_km(&inside, &p);
    let dout = signed_distance_km(&outside, &p);
    assert!(di < 0.0);
    assert!(dout > 0.0);
    assert_eq!(-di, distance_km(&inside, &nearest_vertex(&inside, &p)));
    assert_eq!(dout, distance_km(&outside, &nearest_vertex(&outside, &p)));
}
