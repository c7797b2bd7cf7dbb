//! Geofencing for tracked field inspectors: parse a zone polygon from WKT, test
//! position fixes against it and measure how far outside a fix lies.

pub mod bounds;
pub mod distance;
pub mod error;
pub mod monitor;
pub mod point;
pub mod poly;

pub use bounds::{Bbox, Bounds};
pub use distance::{distance_km, nearest_vertex, signed_distance_km, EARTH_RADIUS_KM};
pub use error::MalformedGeometryError;
pub use monitor::{AlertSeverity, AlertType, ZoneAlert, ZoneHandle, ZoneMonitor, ZoneTransition};
pub use point::{GeoPoint, PositionFix};
pub use poly::{is_inside, parse_wkt, Polygon};
