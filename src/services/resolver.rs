//! Address resolver: batch geocoding with name and proximity de-duplication.
//!
//! Per item, in input order:  name check → geocode → first placemark → proximity check → accept
//!
//! Failures never abort the batch; a dropped item is recorded in
//! [`ResolveOutcome::skipped`] and the run carries on.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::geocoder::Geocoder;
use super::types::{
    AddressItem, Coordinate, ResolveOutcome, ResolvedService, SkipReason, SkippedAddress,
};

/// Meters per degree used by the flat-earth distance approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Two services closer than this are the same real-world place.
pub const DEFAULT_PROXIMITY_METERS: f64 = 30.0;

/// Flat-earth distance in meters: `hypot(Δlat, Δlon) * 111 km`.
///
/// Only meaningful over a few kilometers; longitude degrees are not scaled
/// by latitude.
pub fn approx_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    (a.lat - b.lat).hypot(a.lon - b.lon) * METERS_PER_DEGREE
}

/// Resolves static address lists into located family services.
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
    threshold_m: f64,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            threshold_m: DEFAULT_PROXIMITY_METERS,
        }
    }

    /// Override the near-duplicate radius.
    pub fn with_threshold(mut self, meters: f64) -> Self {
        self.threshold_m = meters;
        self
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    /// Resolve a batch, returning only the accepted services.
    pub async fn resolve_all(&self, input: &[AddressItem]) -> Vec<ResolvedService> {
        self.resolve_detailed(input).await.services
    }

    /// Resolve a batch, also reporting why each dropped item was dropped.
    pub async fn resolve_detailed(&self, input: &[AddressItem]) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();

        for item in input {
            match self.resolve_one(item, &outcome.services).await {
                Ok(service) => {
                    debug!(name = %service.name, coord = %service.coordinate, "accepted");
                    outcome.services.push(service);
                }
                Err(reason) => {
                    debug!(name = %item.name, %reason, "skipped");
                    outcome.skipped.push(SkippedAddress {
                        name: item.name.clone(),
                        address: item.address.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            input = input.len(),
            accepted = outcome.services.len(),
            skipped = outcome.skipped.len(),
            "address resolution finished"
        );
        outcome
    }

    async fn resolve_one(
        &self,
        item: &AddressItem,
        accepted: &[ResolvedService],
    ) -> Result<ResolvedService, SkipReason> {
        let name_key = item.name.to_lowercase();
        if accepted.iter().any(|s| s.name.to_lowercase() == name_key) {
            return Err(SkipReason::DuplicateName);
        }

        let placemarks = self.geocoder.geocode(&item.address).await.map_err(|e| {
            warn!(name = %item.name, address = %item.address, error = %e, "geocoding failed");
            SkipReason::GeocodeFailed { error: e.to_string() }
        })?;

        let coordinate = placemarks
            .first()
            .map(|p| p.coordinate)
            .ok_or(SkipReason::NoResult)?;

        if let Some((existing, distance_m)) = accepted
            .iter()
            .map(|s| (s, approx_distance_m(s.coordinate, coordinate)))
            .find(|(_, d)| *d < self.threshold_m)
        {
            return Err(SkipReason::NearDuplicate {
                of: existing.name.clone(),
                distance_m,
            });
        }

        Ok(ResolvedService::from_item(item, coordinate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeocodeError;
    use crate::services::geocoder::BuiltinGeocoder;
    use crate::services::types::{Placemark, ServiceCategory};
    use crate::catalog;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Address → coordinate table; anything missing fails with NotFound.
    #[derive(Default)]
    struct MockGeocoder {
        table: HashMap<String, Vec<Coordinate>>,
        calls: AtomicUsize,
    }

    impl MockGeocoder {
        fn with(mut self, address: &str, lat: f64, lon: f64) -> Self {
            self.table
                .entry(address.to_string())
                .or_default()
                .push(Coordinate::new(lat, lon));
            self
        }

        fn empty_for(mut self, address: &str) -> Self {
            self.table.insert(address.to_string(), vec![]);
            self
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.table
                .get(address)
                .map(|coords| {
                    coords
                        .iter()
                        .map(|c| Placemark { coordinate: *c, label: None })
                        .collect()
                })
                .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
        }
    }

    fn item(name: &str, address: &str) -> AddressItem {
        AddressItem::new(name, address, ServiceCategory::Pharmacy)
    }

    /// 10 m north of (25.0, -100.0) under the flat formula.
    const TEN_METERS: f64 = 10.0 / METERS_PER_DEGREE;

    fn resolver(mock: MockGeocoder) -> (AddressResolver, Arc<MockGeocoder>) {
        let mock = Arc::new(mock);
        (AddressResolver::new(mock.clone()), mock)
    }

    fn assert_invariants(services: &[ResolvedService], threshold: f64) {
        for (i, a) in services.iter().enumerate() {
            for b in &services[i + 1..] {
                assert_ne!(a.name.to_lowercase(), b.name.to_lowercase());
                assert!(approx_distance_m(a.coordinate, b.coordinate) >= threshold);
            }
        }
    }

    #[test]
    fn test_approx_distance() {
        let a = Coordinate::new(25.0, -100.0);
        let b = Coordinate::new(25.0 + TEN_METERS, -100.0);
        assert_relative_eq!(approx_distance_m(a, b), 10.0, epsilon = 1e-6);
        // 3-4-5 triangle in degrees
        let c = Coordinate::new(0.0, 0.0);
        let d = Coordinate::new(0.0003, 0.0004);
        assert_relative_eq!(approx_distance_m(c, d), 55.5, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_name_duplicate_case_insensitive() {
        let mock = MockGeocoder::default()
            .with("addr1", 25.0, -100.0)
            .with("addr2", 26.0, -101.0);
        let (resolver, mock) = resolver(mock);

        let out = resolver
            .resolve_all(&[item("A", "addr1"), item("a", "addr2")])
            .await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "A");
        // The duplicate is dropped before any geocoding.
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_name_duplicate_even_if_unresolvable() {
        let mock = MockGeocoder::default().with("addr1", 25.0, -100.0);
        let (resolver, _) = resolver(mock);
        let out = resolver
            .resolve_all(&[item("A", "addr1"), item("A", "addr2")])
            .await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_proximity_duplicate_first_wins() {
        let mock = MockGeocoder::default()
            .with("addr1", 25.0, -100.0)
            .with("addr2", 25.0 + TEN_METERS, -100.0);
        let (resolver, _) = resolver(mock);

        let outcome = resolver
            .resolve_detailed(&[item("X", "addr1"), item("Y", "addr2")])
            .await;

        assert_eq!(outcome.services.len(), 1);
        assert_eq!(outcome.services[0].name, "X");
        assert_eq!(outcome.skipped.len(), 1);
        match &outcome.skipped[0].reason {
            SkipReason::NearDuplicate { of, distance_m } => {
                assert_eq!(of, "X");
                assert_relative_eq!(*distance_m, 10.0, epsilon = 1e-6);
            }
            other => panic!("unexpected reason: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exactly_at_threshold_is_kept() {
        let a = Coordinate::new(25.0, -100.0);
        let b = Coordinate::new(25.0003, -100.0004);
        let d = approx_distance_m(a, b);
        let mock = MockGeocoder::default()
            .with("addr1", a.lat, a.lon)
            .with("addr2", b.lat, b.lon);
        let (resolver, _) = resolver(mock);
        let input = [item("X", "addr1"), item("Y", "addr2")];

        let at = resolver.clone().with_threshold(d);
        assert_eq!(at.threshold_m(), d);
        assert_eq!(at.resolve_all(&input).await.len(), 2);

        let just_above = resolver.with_threshold(d + 1e-9);
        let out = just_above.resolve_all(&input).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "X");
    }

    #[tokio::test]
    async fn test_failed_geocode_skipped() {
        let mock = MockGeocoder::default().with("good-addr", 25.0, -100.0);
        let (resolver, _) = resolver(mock);

        let outcome = resolver
            .resolve_detailed(&[
                item("X", "bad-addr"),
                AddressItem::new("Y", "good-addr", ServiceCategory::Park),
            ])
            .await;

        assert_eq!(outcome.services.len(), 1);
        assert_eq!(outcome.services[0].name, "Y");
        assert_eq!(outcome.services[0].category, ServiceCategory::Park);
        assert!(matches!(
            outcome.skipped[0].reason,
            SkipReason::GeocodeFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_result_skipped() {
        let mock = MockGeocoder::default()
            .empty_for("nowhere")
            .with("somewhere", 25.0, -100.0);
        let (resolver, _) = resolver(mock);
        let outcome = resolver
            .resolve_detailed(&[item("X", "nowhere"), item("Y", "somewhere")])
            .await;
        assert_eq!(outcome.services.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::NoResult);
    }

    #[tokio::test]
    async fn test_first_placemark_is_canonical() {
        let mock = MockGeocoder::default()
            .with("addr", 25.0, -100.0)
            .with("addr", 40.0, -3.0);
        let (resolver, _) = resolver(mock);
        let out = resolver.resolve_all(&[item("X", "addr")]).await;
        assert_eq!(out[0].coordinate, Coordinate::new(25.0, -100.0));
    }

    #[tokio::test]
    async fn test_count_and_order_with_partial_failure() {
        // 7 inputs: 2 geocode failures, 1 name duplicate, 1 near-duplicate.
        let mock = MockGeocoder::default()
            .with("a", 25.00, -100.00)
            .with("b", 25.01, -100.00)
            .with("d", 25.02, -100.00)
            .with("e", 25.02 + TEN_METERS, -100.00)
            .with("g", 25.03, -100.00);
        let (resolver, _) = resolver(mock);

        let input = vec![
            item("A", "a"),
            item("B", "b"),
            item("C", "c-missing"),
            item("D", "d"),
            item("E", "e"),
            item("f", "f-missing"),
            item("b", "g"),
        ];
        let outcome = resolver.resolve_detailed(&input).await;

        assert_eq!(outcome.services.len(), input.len() - 2 - 2);
        let names: Vec<_> = outcome.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "D"]);
        assert_eq!(outcome.skipped.len(), 4);
        assert_invariants(&outcome.services, DEFAULT_PROXIMITY_METERS);
    }

    #[tokio::test]
    async fn test_idempotent_runs() {
        let mock = MockGeocoder::default()
            .with("a", 25.00, -100.00)
            .with("b", 25.01, -100.00)
            .with("c", 25.01 + TEN_METERS, -100.00);
        let (resolver, _) = resolver(mock);
        let input = vec![item("A", "a"), item("B", "b"), item("C", "c"), item("D", "d")];

        let first = resolver.resolve_all(&input).await;
        let second = resolver.resolve_all(&input).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let mock = MockGeocoder::default()
            .with("a", 25.0, -100.0)
            .with("b", 25.0 + TEN_METERS, -100.0);
        let (resolver, _) = resolver(mock);
        let resolver = resolver.with_threshold(5.0);
        let out = resolver.resolve_all(&[item("X", "a"), item("Y", "b")]).await;
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (resolver, mock) = resolver(MockGeocoder::default());
        assert!(resolver.resolve_all(&[]).await.is_empty());
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_catalog_offline() {
        let resolver = AddressResolver::new(Arc::new(BuiltinGeocoder));
        let outcome = resolver.resolve_detailed(&catalog::default_addresses()).await;

        assert_eq!(outcome.services.len(), catalog::bbva_addresses().len());
        assert_eq!(outcome.skipped.len(), catalog::azteca_addresses().len());
        assert_invariants(&outcome.services, DEFAULT_PROXIMITY_METERS);
    }
}
