//! Maps raw visit-log rows into `VisitRecord`s.
//!
//! Column lookup is by label. Each field accepts a few aliases because the
//! sheet headers were edited by hand over the years; a label is matched
//! exactly first, then ignoring accents, case and punctuation. A missing
//! column is an empty value, never an error.
use crate::models::{RawRow, VehicleObservation, VisitRecord};
use crate::normalize::{digits_only, normalize_alnum, parse_local_date, title_case};

pub const DATE_LABELS: &[&str] = &["Fecha", "Fecha de Ingreso", "Fecha Recepción"];
pub const NAME_LABELS: &[&str] = &["Nombre", "Nombre del Cliente", "Cliente"];
pub const PHONE_LABELS: &[&str] = &["Teléfono", "Celular", "Tel"];
pub const EMAIL_LABELS: &[&str] = &["Correo", "Correo Electrónico", "Email"];
pub const ADDRESS_LABELS: &[&str] = &["Dirección", "Domicilio", "Calle"];
pub const COLONIA_LABELS: &[&str] = &["Colonia"];
pub const MUNICIPALITY_LABELS: &[&str] = &["Municipio", "Delegación"];
pub const STATE_LABELS: &[&str] = &["Estado"];
pub const BRAND_LABELS: &[&str] = &["Marca"];
pub const MODEL_LABELS: &[&str] = &["Modelo", "Submarca"];
pub const YEAR_LABELS: &[&str] = &["Año"];
pub const PLATES_LABELS: &[&str] = &["Placas", "Placa"];
pub const SERIAL_LABELS: &[&str] = &["No. Serie", "Número de Serie", "Serie", "VIN"];
pub const MOTOR_LABELS: &[&str] = &["Motor"];
pub const ODOMETER_LABELS: &[&str] = &["Kilometraje", "Km"];
pub const FUEL_LABELS: &[&str] = &["Combustible", "Nivel de Gasolina", "Gasolina"];
pub const LAST_SERVICE_LABELS: &[&str] = &["Último Servicio", "Fecha Último Servicio"];

/// Number of trailing serial characters used as the vehicle identity key.
pub const SERIAL_SUFFIX_LEN: usize = 8;

/// Looks up a trimmed cell value by any of `labels`.
///
/// Blank cells fall through to the next alias, so an empty "Teléfono" does
/// not hide a filled "Celular". Yields "" only when no alias has a value.
pub fn field<'a>(row: &'a RawRow, labels: &[&str]) -> &'a str {
    for label in labels {
        if let Some(value) = row.get(*label).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            return value;
        }
    }

    // Tolerate header drift: "TELEFONO", "no serie", "Teléfono:"...
    for label in labels {
        let wanted = normalize_alnum(label);
        if let Some(value) = row
            .iter()
            .filter(|(key, _)| normalize_alnum(key) == wanted)
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
        {
            return value;
        }
    }

    ""
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Uppercased last `SERIAL_SUFFIX_LEN` characters of a normalized serial.
pub fn serial_suffix(normalized_serial: &str) -> String {
    let chars: Vec<char> = normalized_serial.chars().collect();
    let start = chars.len().saturating_sub(SERIAL_SUFFIX_LEN);
    chars[start..].iter().collect::<String>().to_uppercase()
}

/// Builds the vehicle observation for a row, if it carries usable plates or
/// a usable serial number.
pub fn parse_vehicle(row: &RawRow, timestamp: i64) -> Option<VehicleObservation> {
    let plates = field(row, PLATES_LABELS);
    let serial = field(row, SERIAL_LABELS);

    let normalized_plates = normalize_alnum(plates);
    let normalized_serial = normalize_alnum(serial);

    if normalized_plates.is_empty() && normalized_serial.is_empty() {
        return None;
    }

    Some(VehicleObservation {
        brand: non_empty(&title_case(field(row, BRAND_LABELS))),
        model: non_empty(&title_case(field(row, MODEL_LABELS))),
        year: non_empty(field(row, YEAR_LABELS)),
        plates: non_empty(&plates.to_uppercase()),
        normalized_plates,
        serial_number: non_empty(&serial.to_uppercase()),
        last8_of_serial: serial_suffix(&normalized_serial),
        motor: non_empty(field(row, MOTOR_LABELS)),
        odometer: non_empty(field(row, ODOMETER_LABELS)),
        fuel_level: non_empty(field(row, FUEL_LABELS)),
        last_service_date: non_empty(field(row, LAST_SERVICE_LABELS)),
        timestamp,
    })
}

/// Parses one row. Returns `None` when the row has neither a name nor any
/// phone digits, since nothing can be attributed to a client.
pub fn parse_row(row: &RawRow) -> Option<VisitRecord> {
    let raw_name = field(row, NAME_LABELS);
    let raw_phone = field(row, PHONE_LABELS);

    if raw_name.is_empty() && digits_only(raw_phone).is_empty() {
        return None;
    }

    let timestamp = parse_local_date(field(row, DATE_LABELS));

    Some(VisitRecord {
        raw_name: non_empty(raw_name),
        raw_phone: non_empty(raw_phone),
        email: non_empty(field(row, EMAIL_LABELS)),
        address: non_empty(field(row, ADDRESS_LABELS)),
        colonia: non_empty(field(row, COLONIA_LABELS)),
        municipality: non_empty(field(row, MUNICIPALITY_LABELS)),
        state: non_empty(field(row, STATE_LABELS)),
        timestamp,
        vehicle: parse_vehicle(row, timestamp),
    })
}
