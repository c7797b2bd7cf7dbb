use crate::point::GeoPoint;


#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bbox {
    /// Smallest box holding every point, `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Bbox {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lng: first.longitude,
            max_lng: first.longitude,
        };
        Some(points.iter().fold(init, |b, p| Bbox {
            min_lat: b.min_lat.min(p.latitude),
            max_lat: b.max_lat.max(p.latitude),
            min_lng: b.min_lng.min(p.longitude),
            max_lng: b.max_lng.max(p.longitude),
        }))
    }
}

pub trait Bounds {
    fn contains(&self, p: &GeoPoint) -> bool;
}

impl Bounds for Bbox {
    fn contains(&self, p: &GeoPoint) -> bool {
        p.latitude >= self.min_lat && p.latitude <= self.max_lat &&
        p.longitude >= self.min_lng && p.longitude <= self.max_lng
    }
}

#[test]
fn bbox_test() {
    let pts = vec![
        GeoPoint::new(-12.05, -77.05),
        GeoPoint::new(-12.05, -77.04),
        GeoPoint::new(-12.04, -77.04),
        GeoPoint::new(-12.04, -77.05),
    ];
    let b = Bbox::from_points(&pts).unwrap();
    assert_eq!(b, Bbox { min_lat: -12.05, max_lat: -12.04, min_lng: -77.05, max_lng: -77.04 });
    assert!(pts.iter().all(|p| b.contains(p)));
    assert!(b.contains(&GeoPoint::new(-12.045, -77.045)));
    assert!(!b.contains(&GeoPoint::new(-12.10, -77.045)));
    assert!(!b.contains(&GeoPoint::new(-12.045, -77.10)));
    assert!(Bbox::from_points(&[]).is_none());
}
