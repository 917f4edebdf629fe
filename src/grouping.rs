use crate::models::{ClientProfile, Vehicle, VisitRecord};
use crate::normalize::{digits_only, normalize_name, title_case};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Placeholder entered at reception when the client gives no phone.
pub const PHONE_SENTINEL: &str = "00";

/// Phones with this many digits or fewer are too short to group on.
pub const MIN_GROUPING_PHONE_DIGITS: usize = 5;

/// Coarse identity bucket for visit records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupingKey {
    /// Digits-only phone number.
    Phone(String),
    /// Normalized name, used when no usable phone is present.
    Name(String),
}

impl GroupingKey {
    pub fn for_record(record: &VisitRecord) -> Self {
        let digits = digits_only(record.raw_phone.as_deref().unwrap_or(""));
        if digits.len() > MIN_GROUPING_PHONE_DIGITS && digits != PHONE_SENTINEL {
            GroupingKey::Phone(digits)
        } else {
            GroupingKey::Name(normalize_name(record.raw_name.as_deref().unwrap_or("")))
        }
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingKey::Phone(digits) => write!(f, "phone:{}", digits),
            GroupingKey::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// Digits of a phone, or `None` when empty or the `"00"` placeholder.
pub fn usable_phone_digits(phone: Option<&str>) -> Option<String> {
    let digits = digits_only(phone.unwrap_or(""));
    if digits.is_empty() || digits == PHONE_SENTINEL {
        None
    } else {
        Some(digits)
    }
}

/// Folds a vehicle observation into a vehicle list.
///
/// A serial-suffix match takes precedence over a plates match, so a
/// replacement can never leave two entries with the same serial suffix.
/// The stored entry is replaced when the observation is at least as new
/// (same-day revisits still refresh odometer and fuel readings).
pub fn merge_vehicle(vehicles: &mut Vec<Vehicle>, observation: Vehicle) {
    let existing = vehicles
        .iter()
        .position(|v| v.same_serial(&observation))
        .or_else(|| vehicles.iter().position(|v| v.same_plates(&observation)));

    match existing {
        Some(idx) => {
            if observation.timestamp >= vehicles[idx].timestamp {
                vehicles[idx] = observation;
            }
        }
        None => vehicles.push(observation),
    }
}

/// Overwrites `slot` only when `incoming` carries a value.
fn replace_if_present(slot: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

impl ClientProfile {
    /// Seeds a provisional profile from its first visit record.
    pub fn from_record(record: VisitRecord) -> Self {
        let mut profile = ClientProfile {
            id: Uuid::new_v4(),
            name: record.raw_name.as_deref().map(title_case),
            phone: record.raw_phone,
            email: record.email,
            address: record.address,
            colonia: record.colonia,
            municipality: record.municipality,
            state: record.state,
            vehicles: Vec::new(),
            latest_visit_timestamp: record.timestamp,
            visit_count: 1,
        };
        if let Some(vehicle) = record.vehicle {
            profile.vehicles.push(vehicle);
        }
        profile
    }

    /// Absorbs a later visit for the same grouping key.
    ///
    /// Scalars follow the strictly newer visit and blank incoming values never
    /// erase known ones. Equal timestamps keep the values of the row seen
    /// first.
    pub fn absorb_record(&mut self, record: VisitRecord) {
        if record.timestamp > self.latest_visit_timestamp {
            replace_if_present(&mut self.name, record.raw_name.as_deref().map(title_case));
            replace_if_present(&mut self.phone, record.raw_phone);
            replace_if_present(&mut self.email, record.email);
            replace_if_present(&mut self.address, record.address);
            replace_if_present(&mut self.colonia, record.colonia);
            replace_if_present(&mut self.municipality, record.municipality);
            replace_if_present(&mut self.state, record.state);
            self.latest_visit_timestamp = record.timestamp;
        }

        if let Some(vehicle) = record.vehicle {
            merge_vehicle(&mut self.vehicles, vehicle);
        }
        self.visit_count += 1;
    }
}

/// Single pass building one provisional profile per grouping key.
///
/// Profiles come back in first-seen key order.
pub fn group_records<I>(records: I) -> Vec<ClientProfile>
where
    I: IntoIterator<Item = VisitRecord>,
{
    let mut index: HashMap<GroupingKey, usize> = HashMap::new();
    let mut profiles: Vec<ClientProfile> = Vec::new();

    for record in records {
        let key = GroupingKey::for_record(&record);
        match index.get(&key) {
            Some(&idx) => profiles[idx].absorb_record(record),
            None => {
                index.insert(key, profiles.len());
                profiles.push(ClientProfile::from_record(record));
            }
        }
    }

    profiles
}
