//! Core types for the family-services subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Hours text for services whose opening hours come from the map provider.
pub const MAP_HOURS_PLACEHOLDER: &str = "Ver en el mapa";

/// Kind of family service shown around a stadium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Pharmacy,
    Supermarket,
    BabySupplies,
    Clinic,
    Parking,
    Cafe,
    Park,
    Atm,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 8] = [
        Self::Pharmacy,
        Self::Supermarket,
        Self::BabySupplies,
        Self::Clinic,
        Self::Parking,
        Self::Cafe,
        Self::Park,
        Self::Atm,
    ];

    /// Display title (Spanish, as shown in the app).
    pub fn title(&self) -> &'static str {
        match self {
            Self::Pharmacy => "Farmacia",
            Self::Supermarket => "Supermercado",
            Self::BabySupplies => "Bebés & Pañales",
            Self::Clinic => "Clínica",
            Self::Parking => "Estacionamiento",
            Self::Cafe => "Cafetería",
            Self::Park => "Parque",
            Self::Atm => "Cajero",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Pharmacy => "\u{1F48A}",
            Self::Supermarket => "\u{1F6D2}",
            Self::BabySupplies => "\u{1F476}",
            Self::Clinic => "\u{1F3E5}",
            Self::Parking => "\u{1F17F}\u{FE0F}",
            Self::Cafe => "\u{2615}\u{FE0F}",
            Self::Park => "\u{1F333}",
            Self::Atm => "\u{1F3E7}",
        }
    }

    /// Parse the snake_case wire name ("baby_supplies") or a few common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        let cat = match key.as_str() {
            "pharmacy" | "farmacia" => Self::Pharmacy,
            "supermarket" | "supermercado" => Self::Supermarket,
            "baby_supplies" | "baby" | "bebes" => Self::BabySupplies,
            "clinic" | "clinica" | "hospital" => Self::Clinic,
            "parking" | "estacionamiento" => Self::Parking,
            "cafe" | "cafeteria" => Self::Cafe,
            "park" | "parque" => Self::Park,
            "atm" | "cajero" => Self::Atm,
            _ => return None,
        };
        Some(cat)
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// One entry of a static address list, waiting to be geocoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressItem {
    pub name: String,
    pub address: String,
    pub category: ServiceCategory,
}

impl AddressItem {
    pub fn new(name: &str, address: &str, category: ServiceCategory) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            category,
        }
    }
}

/// A geocoding candidate returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub coordinate: Coordinate,
    /// Provider label, e.g. Nominatim's `display_name`.
    pub label: Option<String>,
}

/// A family service located on the map. Built only by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedService {
    pub id: Uuid,
    pub name: String,
    pub category: ServiceCategory,
    pub coordinate: Coordinate,
    pub description: String,
    pub amenities: Vec<String>,
    pub hours: String,
    pub phone: Option<String>,
}

impl ResolvedService {
    pub(crate) fn from_item(item: &AddressItem, coordinate: Coordinate) -> Self {
        Self {
            id: service_id(&item.name),
            name: item.name.clone(),
            category: item.category,
            coordinate,
            description: item.address.clone(),
            amenities: Vec::new(),
            hours: MAP_HOURS_PLACEHOLDER.to_string(),
            phone: None,
        }
    }

    pub fn display_line(&self) -> String {
        format!(
            "{} {} [{}]\n  \u{1F4CD} {}\n  \u{1F4D0} {}",
            self.category.glyph(),
            self.name,
            self.category.title(),
            self.description,
            self.coordinate,
        )
    }
}

/// Stable id derived from the case-folded name. Names are unique within a
/// resolved list, so ids are too.
fn service_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.to_lowercase().as_bytes())
}

/// Why the resolver dropped an input item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    DuplicateName,
    GeocodeFailed { error: String },
    NoResult,
    NearDuplicate { of: String, distance_m: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "duplicate name"),
            Self::GeocodeFailed { error } => write!(f, "geocoding failed: {}", error),
            Self::NoResult => write!(f, "no geocoding result"),
            Self::NearDuplicate { of, distance_m } => {
                write!(f, "within {:.1} m of '{}'", distance_m, of)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAddress {
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Full result of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveOutcome {
    pub services: Vec<ResolvedService>,
    pub skipped: Vec<SkippedAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&ServiceCategory::BabySupplies).unwrap();
        assert_eq!(json, "\"baby_supplies\"");
        let back: ServiceCategory = serde_json::from_str("\"clinic\"").unwrap();
        assert_eq!(back, ServiceCategory::Clinic);
    }

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!(ServiceCategory::parse("Farmacia"), Some(ServiceCategory::Pharmacy));
        assert_eq!(ServiceCategory::parse("baby-supplies"), Some(ServiceCategory::BabySupplies));
        assert_eq!(ServiceCategory::parse("bowling"), None);
    }

    #[test]
    fn test_service_id_case_insensitive() {
        let a = AddressItem::new("Walmart", "x", ServiceCategory::Supermarket);
        let b = AddressItem::new("WALMART", "y", ServiceCategory::Supermarket);
        let coord = Coordinate::new(0.0, 0.0);
        assert_eq!(
            ResolvedService::from_item(&a, coord).id,
            ResolvedService::from_item(&b, coord).id
        );
    }

    #[test]
    fn test_resolved_service_defaults() {
        let item = AddressItem::new("Cela Hospital", "P.º de las Américas 1881", ServiceCategory::Clinic);
        let svc = ResolvedService::from_item(&item, Coordinate::new(25.65, -100.26));
        assert_eq!(svc.description, "P.º de las Américas 1881");
        assert!(svc.amenities.is_empty());
        assert_eq!(svc.hours, MAP_HOURS_PLACEHOLDER);
        assert!(svc.phone.is_none());
    }

    #[test]
    fn test_coordinate_display() {
        let c = Coordinate::new(19.3028, -99.1507);
        assert_eq!(c.to_string(), "19.3028\u{00B0}N, 99.1507\u{00B0}W");
    }
}
