use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============ Source Rows ============

/// One raw row from the record store, keyed by column label.
pub type RawRow = HashMap<String, String>;

// ============ Resolution Models ============

/// A vehicle as observed on a single visit.
///
/// Identity for deduplication is the pair (`last8_of_serial`,
/// `normalized_plates`): two observations describe the same vehicle when
/// either key is non-empty and equal. The identity keys are internal and are
/// not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleObservation {
    /// Brand, title-cased.
    pub brand: Option<String>,
    /// Model, title-cased.
    pub model: Option<String>,
    /// Model year as entered.
    pub year: Option<String>,
    /// Plates in display form (trimmed, uppercased).
    pub plates: Option<String>,
    /// Plates reduced to uppercase alphanumerics.
    #[serde(skip)]
    pub normalized_plates: String,
    /// Serial number (VIN) in display form.
    pub serial_number: Option<String>,
    /// Last 8 characters of the normalized serial, or all of it when shorter.
    #[serde(skip)]
    pub last8_of_serial: String,
    /// Engine description.
    pub motor: Option<String>,
    /// Odometer reading as entered.
    pub odometer: Option<String>,
    /// Fuel level at check-in.
    pub fuel_level: Option<String>,
    /// Last service date, display string.
    pub last_service_date: Option<String>,
    /// Visit timestamp (epoch millis, 0 when unknown).
    #[serde(rename = "observed_at")]
    pub timestamp: i64,
}

/// Vehicles on a profile are the newest observation per vehicle identity.
pub type Vehicle = VehicleObservation;

impl VehicleObservation {
    /// True when both observations share a non-empty serial suffix.
    pub fn same_serial(&self, other: &VehicleObservation) -> bool {
        !self.last8_of_serial.is_empty() && self.last8_of_serial == other.last8_of_serial
    }

    /// True when both observations share non-empty normalized plates.
    pub fn same_plates(&self, other: &VehicleObservation) -> bool {
        !self.normalized_plates.is_empty() && self.normalized_plates == other.normalized_plates
    }

    pub fn is_same_vehicle(&self, other: &VehicleObservation) -> bool {
        self.same_serial(other) || self.same_plates(other)
    }
}

/// One ingested visit row. Exists only during a recompute.
///
/// Blank cells are `None`: unknown, never "explicitly cleared".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitRecord {
    pub raw_name: Option<String>,
    pub raw_phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub colonia: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    /// Visit date as epoch millis, 0 when unparsable.
    pub timestamp: i64,
    pub vehicle: Option<VehicleObservation>,
}

/// A deduplicated client with its merged vehicle history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientProfile {
    /// Opaque id, stable only within one computed snapshot.
    pub id: Uuid,
    /// Title-cased name from the most recent visit.
    pub name: Option<String>,
    /// Phone as entered on the most recent visit.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub colonia: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    /// Vehicles in first-seen order.
    pub vehicles: Vec<Vehicle>,
    /// Greatest visit timestamp that contributed to this profile.
    pub latest_visit_timestamp: i64,
    /// Number of visit rows folded into this profile.
    pub visit_count: usize,
}

// ============ API Models ============

/// Query parameters for `GET /api/v1/clients/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Free-text query: name fragment, phone digits or plates.
    pub q: Option<String>,
}

/// Search result envelope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    /// Matching profiles, newest first, capped.
    pub results: Vec<ClientProfile>,
    /// Match count before truncation.
    pub total: usize,
}

/// Snapshot status for `GET /api/v1/clients/cache`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    /// Whether a snapshot is currently held.
    pub cached: bool,
    /// Whether the held snapshot is past its TTL.
    pub expired: bool,
    /// Profiles in the held snapshot.
    pub profiles: usize,
    /// When the held snapshot was computed.
    pub computed_at: Option<DateTime<Utc>>,
    /// Age of the held snapshot in seconds.
    pub age_secs: Option<i64>,
    /// Configured TTL in seconds.
    pub ttl_secs: u64,
    /// Source sheet.
    pub sheet: String,
    /// Counts from the last recompute.
    pub stats: Option<crate::resolution::ResolutionStats>,
}
