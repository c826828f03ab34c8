//! Family-services subsystem for Family+.
//!
//! Geocodes static address lists around each stadium, drops duplicates by
//! name and by proximity, and publishes the result to a view-model.

pub mod geocoder;
pub mod model;
pub mod resolver;
pub mod types;

pub use geocoder::{BuiltinGeocoder, FallbackGeocoder, Geocoder, NominatimGeocoder};
pub use model::{ResolveHandle, ServicesModel, ServicesSnapshot};
pub use resolver::{approx_distance_m, AddressResolver, DEFAULT_PROXIMITY_METERS};
pub use types::{
    AddressItem, Coordinate, Placemark, ResolveOutcome, ResolvedService, ServiceCategory,
    SkipReason, SkippedAddress,
};
