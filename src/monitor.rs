use std::sync::{Arc, RwLock};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::bounds::Bounds;
use crate::distance::signed_distance_km;
use crate::point::GeoPoint;
use crate::poly::{parse_wkt, Polygon};


#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    OutOfZone,
    LowBattery,
    GpsDisabled,
    AppClosed,
    Panic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Grade a signed zone distance in km (negative is inside).
    pub fn for_distance(km: f64) -> Self {
        if km <= 0.0 {
            AlertSeverity::Low
        } else if km < 0.1 {
            AlertSeverity::Medium
        } else if km < 1.0 {
            AlertSeverity::High
        } else {
            AlertSeverity::Critical
        }
    }
}

/// Alert payload handed to the alerting backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneAlert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ZoneAlert {
    pub fn out_of_zone(at: &GeoPoint) -> Self {
        Self {
            alert_type: AlertType::OutOfZone,
            severity: AlertSeverity::High,
            message: "Inspector is outside the assigned zone".to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
        }
    }
}

/// Holds the active zone. Replacing it swaps the whole `Arc`; a reader that
/// already took `current()` keeps evaluating the polygon it got.
#[derive(Default)]
pub struct ZoneHandle {
    zone: RwLock<Option<Arc<Polygon>>>,
}

impl ZoneHandle {
    pub fn new(zone: Option<Polygon>) -> Self {
        Self { zone: RwLock::new(zone.map(Arc::new)) }
    }

    pub fn current(&self) -> Option<Arc<Polygon>> {
        match self.zone.read() {
            Ok(z) => z.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, zone: Option<Polygon>) -> Option<Arc<Polygon>> {
        let next = zone.map(Arc::new);
        match self.zone.write() {
            Ok(mut z) => std::mem::replace(&mut *z, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    /// Load the zone of an assignment. Missing or malformed geometry leaves the
    /// handle with no zone, which disables out-of-zone alerting.
    pub fn load_wkt(&self, geometry: Option<&str>) -> bool {
        match geometry.map(parse_wkt) {
            Some(Ok(p)) => {
                info!("Zone loaded with {} vertices", p.len());
                self.replace(Some(p));
                true
            }
            Some(Err(e)) => {
                error!("Discarding zone geometry: {}", e);
                self.replace(None);
                false
            }
            None => {
                warn!("Assignment has no zone geometry");
                self.replace(None);
                false
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ZoneTransition {
    Exited,
    Entered,
}

/// Tracks in/out state across position fixes. No debouncing: a fix wobbling
/// across the boundary produces a transition every time.
pub struct ZoneMonitor {
    zone: Arc<ZoneHandle>,
    out_of_zone: bool,
}

impl ZoneMonitor {
    pub fn new(zone: Arc<ZoneHandle>) -> Self {
        Self { zone, out_of_zone: false }
    }

    pub fn out_of_zone(&self) -> bool {
        self.out_of_zone
    }

    /// Evaluate a fix against the current zone. `Exited` is the only
    /// transition that should raise an alert.
    pub fn observe(&mut self, fix: &GeoPoint) -> Option<ZoneTransition> {
        let zone = self.zone.current()?;
        let out = !zone.contains(fix);
        if out == self.out_of_zone {
            return None;
        }
        self.out_of_zone = out;
        if out {
            warn!("Left zone at {}, {}", fix.latitude, fix.longitude);
            Some(ZoneTransition::Exited)
        } else {
            info!("Back inside zone at {}, {}", fix.latitude, fix.longitude);
            Some(ZoneTransition::Entered)
        }
    }

    /// Flag reported with periodic position uploads, `false` with no zone.
    pub fn is_out_of_zone(&self, fix: &GeoPoint) -> bool {
        self.zone.current().map_or(false, |z| !z.contains(fix))
    }

    pub fn signed_distance_km(&self, fix: &GeoPoint) -> Option<f64> {
        self.zone.current().map(|z| signed_distance_km(fix, &z))
    }
}

#[cfg(test)]
const SQUARE: &str = "POLYGON ((-77.05 -12.05, -77.04 -12.05, -77.04 -12.04, -77.05 -12.04, -77.05 -12.05))";

#[test]
fn monitor_transitions() {
    let handle = Arc::new(ZoneHandle::default());
    assert!(handle.load_wkt(Some(SQUARE)));
    let mut m = ZoneMonitor::new(handle);

    let inside = GeoPoint::new(-12.045, -77.045);
    let outside = GeoPoint::new(-12.10, -77.045);

    assert_eq!(m.observe(&inside), None);
    assert_eq!(m.observe(&outside), Some(ZoneTransition::Exited));
    assert_eq!(m.observe(&outside), None);
    assert!(m.out_of_zone());
    assert_eq!(m.observe(&inside), Some(ZoneTransition::Entered));
    assert_eq!(m.observe(&outside), Some(ZoneTransition::Exited));
}

#[test]
fn monitor_first_fix_outside_alerts() {
    let handle = Arc::new(ZoneHandle::new(Some(parse_wkt(SQUARE).unwrap())));
    let mut m = ZoneMonitor::new(handle);
    assert_eq!(m.observe(&GeoPoint::new(-12.045, -77.10)), Some(ZoneTransition::Exited));
}

#[test]
fn monitor_without_zone_is_silent() {
    let handle = Arc::new(ZoneHandle::default());
    assert!(!handle.load_wkt(Some("POLYGON ((1 2, abc 3))")));
    assert!(handle.current().is_none());
    let mut m = ZoneMonitor::new(handle.clone());
    let far = GeoPoint::new(40.0, 3.0);
    assert_eq!(m.observe(&far), None);
    assert!(!m.is_out_of_zone(&far));
    assert_eq!(m.signed_distance_km(&far), None);

    assert!(handle.load_wkt(Some(SQUARE)));
    assert!(m.is_out_of_zone(&far));
    assert!(!handle.load_wkt(None));
    assert_eq!(m.observe(&far), None);
}

#[test]
fn swap_keeps_old_readers() {
    let handle = Arc::new(ZoneHandle::new(Some(parse_wkt(SQUARE).unwrap())));
    let held = handle.current().unwrap();
    let old = handle.replace(Some(parse_wkt("POLYGON ((0 0, 1 0, 1 1, 0 1))").unwrap()));
    assert!(Arc::ptr_eq(&held, &old.unwrap()));
    assert!(held.contains(&GeoPoint::new(-12.045, -77.045)));

    let mut m = ZoneMonitor::new(handle.clone());
    assert_eq!(m.observe(&GeoPoint::new(-12.045, -77.045)), Some(ZoneTransition::Exited));
    assert_eq!(m.observe(&GeoPoint::new(0.5, 0.5)), Some(ZoneTransition::Entered));
}

#[test]
fn swap_across_threads() {
    let handle = Arc::new(ZoneHandle::new(Some(parse_wkt(SQUARE).unwrap())));
    let probe = GeoPoint::new(-12.045, -77.045);
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let h = handle.clone();
            std::thread::spawn(move || {
                (0..1000).all(|_| match h.current() {
                    Some(z) => z.len() == 5 || z.len() == 4,
                    None => false,
                })
            })
        })
        .collect();
    for _ in 0..100 {
        handle.replace(Some(parse_wkt("POLYGON ((0 0, 1 0, 1 1, 0 1))").unwrap()));
        handle.replace(Some(parse_wkt(SQUARE).unwrap()));
    }
    for r in readers {
        assert!(r.join().unwrap());
    }
    assert!(handle.current().unwrap().contains(&probe));
}

#[test]
fn alert_payload() {
    let a = ZoneAlert::out_of_zone(&GeoPoint::new(-12.1, -77.0));
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["alert_type"], "out_of_zone");
    assert_eq!(v["severity"], "high");
    assert_eq!(v["latitude"], -12.1);
    assert_eq!(AlertType::OutOfZone.to_string(), "out_of_zone");
    assert_eq!("gps_disabled".parse::<AlertType>().unwrap(), AlertType::GpsDisabled);
    assert_eq!(ZoneTransition::Exited.to_string(), "exited");
}

#[test]
fn severity_grading() {
    assert_eq!(AlertSeverity::for_distance(-0.5), AlertSeverity::Low);
    assert_eq!(AlertSeverity::for_distance(0.05), AlertSeverity::Medium);
    assert_eq!(AlertSeverity::for_distance(0.5), AlertSeverity::High);
    assert_eq!(AlertSeverity::for_distance(12.0), AlertSeverity::Critical);
    assert!(AlertSeverity::Critical > AlertSeverity::High);
}
