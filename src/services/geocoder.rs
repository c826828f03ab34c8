//! Geocoding providers: Nominatim, built-in offline table, and a fallback chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::types::{Coordinate, Placemark};
use crate::config::Config;
use crate::error::GeocodeError;

/// Forward geocoding: free-text address in, zero or more placemarks out.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError> {
        (**self).geocode(address).await
    }
}

// ─── Nominatim provider ─────────────────────────────────────────

#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// OpenStreetMap Nominatim search client.
///
/// Requests are spaced at least `min_interval` apart to respect the public
/// instance's usage policy.
pub struct NominatimGeocoder {
    agent: ureq::Agent,
    base_url: String,
    limit: usize,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout)
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            limit: 3,
            min_interval: config.geocode_interval,
            last_request: Mutex::new(None),
        }
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError> {
        self.throttle().await;

        let agent = self.agent.clone();
        let url = format!("{}/search", self.base_url);
        let query = address.to_string();
        let limit = self.limit.to_string();

        let results = tokio::task::spawn_blocking(move || {
            let response = agent
                .get(&url)
                .query("q", &query)
                .query("format", "jsonv2")
                .query("limit", &limit)
                .call()
                .map_err(map_ureq_error)?;

            response
                .into_json::<Vec<NominatimResult>>()
                .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
        })
        .await
        .map_err(|e| GeocodeError::Network(format!("geocoding task failed: {}", e)))??;

        debug!(address, candidates = results.len(), "nominatim answered");
        Ok(results.into_iter().filter_map(to_placemark).collect())
    }
}

fn map_ureq_error(e: ureq::Error) -> GeocodeError {
    match e {
        ureq::Error::Status(429, _) => GeocodeError::RateLimited,
        ureq::Error::Status(code, _) => GeocodeError::Network(format!("HTTP {}", code)),
        ureq::Error::Transport(t) => GeocodeError::Network(t.to_string()),
    }
}

fn to_placemark(r: NominatimResult) -> Option<Placemark> {
    let lat: f64 = r.lat.trim().parse().ok()?;
    let lon: f64 = r.lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Placemark {
        coordinate: Coordinate::new(lat, lon),
        label: r.display_name,
    })
}

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinPlace {
    address: &'static str,
    lat: f64,
    lon: f64,
}

/// Surveyed coordinates for the BBVA address list, usable without network.
const BUILTIN_PLACES: &[BuiltinPlace] = &[
    BuiltinPlace {
        address: "C. Mariano Matamoros 300, Centro de Guadalupe, 67100 Guadalupe, N.L.",
        lat: 25.6731688, lon: -100.2614015,
    },
    BuiltinPlace {
        address: "Sin Nombre de Col 31, 67155 Guadalupe, N.L.",
        lat: 25.6793539, lon: -100.2474187,
    },
    BuiltinPlace {
        address: "Independencia 410, Centro de Guadalupe, 67100 Monterrey, N.L.",
        lat: 25.6790117, lon: -100.2618477,
    },
    BuiltinPlace {
        address: "P.º de las Américas 1881, Contry Sol, 67174 Guadalupe, N.L.",
        lat: 25.6566042, lon: -100.2620486,
    },
    BuiltinPlace {
        address: "Av. Eloy Cavazos 2424, Las Villas, 67175 Guadalupe, N.L.",
        lat: 25.6621216, lon: -100.2383595,
    },
    BuiltinPlace {
        address: "Av. Eloy Cavazos entre AV. QUETZALES Y ANACLETO ZAPATA, Privadas del Contry, 67170 Guadalupe, N.L.",
        lat: 25.6621861, lon: -100.2410861,
    },
    BuiltinPlace {
        address: "Quetzales 2902, Privadas del Contry, 67175 Guadalupe, N.L.",
        lat: 25.6622934, lon: -100.2419538,
    },
    BuiltinPlace {
        address: "Av. Las Torres 627a-L, Sin Nombre de Col 33, 67140 Guadalupe, N.L.",
        lat: 25.6721163, lon: -100.2495679,
    },
    BuiltinPlace {
        address: "Av. Eloy Cavazos 2051, Valles de Guadalupe, 67170 Guadalupe, N.L.",
        lat: 25.6638862, lon: -100.2419628,
    },
    BuiltinPlace {
        address: "Av. Eloy Cavazos 2000, Contry Sol 6to Sector, 67174 Guadalupe, N.L.",
        lat: 25.6617050, lon: -100.2602078,
    },
    BuiltinPlace {
        address: "Gral. Ignacio Zaragoza 500, Centro, 67100 Guadalupe, N.L.",
        lat: 25.6719561, lon: -100.2585779,
    },
    BuiltinPlace {
        address: "Lic. Sebastián Lerdo de Tejada 102, Venus, 67144 Guadalupe, N.L.",
        lat: 25.6744653, lon: -100.2528423,
    },
    BuiltinPlace {
        address: "La Quinta 2402, La Quinta, 67170 Guadalupe, N.L.",
        lat: 25.6649314, lon: -100.2428664,
    },
    BuiltinPlace {
        address: "C. José Peón y Contreras, Bosques de La Pastora 1er Sector, 67176 Guadalupe, N.L.",
        lat: 25.6597258, lon: -100.2549650,
    },
    BuiltinPlace {
        address: "Calle Benito Juárez 802, Centro, 67100 Guadalupe, N.L.",
        lat: 25.6795243, lon: -100.2491445,
    },
    BuiltinPlace {
        address: "Av. Eloy Cavazos, Jardines de La Pastora, 67140 Guadalupe, N.L.",
        lat: 25.6657175, lon: -100.2482422,
    },
    BuiltinPlace {
        address: "Vereda Bosque La Pastora, Sin Nombre de Col 33, 67174 Guadalupe, N.L.",
        lat: 25.6644383, lon: -100.2505992,
    },
    BuiltinPlace {
        address: "Centro de Guadalupe, 67100 Guadalupe, N.L.",
        lat: 25.6770972, lon: -100.2591387,
    },
];

/// Lowercase and collapse whitespace so trivially reformatted addresses match.
fn normalize_address(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Offline geocoder backed by [`BUILTIN_PLACES`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinGeocoder;

impl BuiltinGeocoder {
    pub fn lookup(&self, address: &str) -> Option<Placemark> {
        let q = normalize_address(address);
        BUILTIN_PLACES
            .iter()
            .find(|p| normalize_address(p.address) == q)
            .map(|p| Placemark {
                coordinate: Coordinate::new(p.lat, p.lon),
                label: Some(p.address.to_string()),
            })
    }
}

#[async_trait]
impl Geocoder for BuiltinGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError> {
        self.lookup(address)
            .map(|p| vec![p])
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}

// ─── Fallback chain ─────────────────────────────────────────────

/// Tries `primary`; on error or an empty answer, asks `fallback`.
///
/// When both fail the primary's error is returned; when the primary simply
/// found nothing and the fallback misses too, the answer stays empty.
pub struct FallbackGeocoder<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Geocoder, F: Geocoder> FallbackGeocoder<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Geocoder, F: Geocoder> Geocoder for FallbackGeocoder<P, F> {
    async fn geocode(&self, address: &str) -> Result<Vec<Placemark>, GeocodeError> {
        // `None` means the primary answered with no matches.
        let primary_err = match self.primary.geocode(address).await {
            Ok(found) if !found.is_empty() => return Ok(found),
            Ok(_) => None,
            Err(e) => {
                warn!(address, error = %e, "primary geocoder failed, trying fallback");
                Some(e)
            }
        };

        match self.fallback.geocode(address).await {
            Ok(found) if !found.is_empty() => Ok(found),
            _ => match primary_err {
                Some(e) => Err(e),
                None => Ok(Vec::new()),
            },
        }
    }
}
