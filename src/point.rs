use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees (WGS-84). Values are taken as given,
/// no range checks or normalization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A location reading as reported by the device. Only `lat`/`lng` take part in
/// zone evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl PositionFix {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

impl From<PositionFix> for GeoPoint {
    fn from(fix: PositionFix) -> Self {
        fix.point()
    }
}

#[test]
fn fix_from_json() {
    let fix: PositionFix = serde_json::from_str(r#"{"lat":-12.045,"lng":-77.045,"accuracy":8.5,"timestamp":1718000000000}"#).unwrap();
    assert_eq!(fix.point(), GeoPoint::new(-12.045, -77.045));
    assert_eq!(fix.accuracy, Some(8.5));

    let bare: PositionFix = serde_json::from_str(r#"{"lat":1.0,"lng":2.0}"#).unwrap();
    assert_eq!(bare.accuracy, None);
    assert_eq!(GeoPoint::from(bare), GeoPoint::new(1.0, 2.0));
}
