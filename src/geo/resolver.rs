use ahash::AHashMap;
use lazy_static::lazy_static;
use log::{trace, warn};
use crate::config::subsystems::ResolverConfig;
use crate::types::{GeoPoint, Listing};

lazy_static! {
    /// Approximate centers of the Seoul districts (gu).
    static ref DISTRICT_CENTERS: AHashMap<&'static str, GeoPoint> = {
        let centers: [(&str, f64, f64); 25] = [
            ("강남구", 37.5172, 127.0473),
            ("강동구", 37.5301, 127.1238),
            ("강북구", 37.6396, 127.0257),
            ("강서구", 37.5509, 126.8495),
            ("관악구", 37.4784, 126.9516),
            ("광진구", 37.5385, 127.0823),
            ("구로구", 37.4954, 126.8874),
            ("금천구", 37.4569, 126.8955),
            ("노원구", 37.6542, 127.0568),
            ("도봉구", 37.6688, 127.0471),
            ("동대문구", 37.5744, 127.0396),
            ("동작구", 37.5124, 126.9393),
            ("마포구", 37.5663, 126.9019),
            ("서대문구", 37.5791, 126.9368),
            ("서초구", 37.4837, 127.0324),
            ("성동구", 37.5633, 127.0371),
            ("성북구", 37.5894, 127.0167),
            ("송파구", 37.5145, 127.1059),
            ("양천구", 37.5170, 126.8664),
            ("영등포구", 37.5264, 126.8962),
            ("용산구", 37.5324, 126.9900),
            ("은평구", 37.6027, 126.9291),
            ("종로구", 37.5735, 126.9790),
            ("중구", 37.5641, 126.9979),
            ("중랑구", 37.6066, 127.0927),
        ];
        centers.iter()
            .map(|&(name, lat, lng)| (name, GeoPoint::new(lat, lng)))
            .collect()
    };
}

/// Fallback when even the configured default district is unknown.
const FALLBACK_CENTER: GeoPoint = GeoPoint { latitude: 37.5172, longitude: 127.0473 };

// Multipliers applied to the name hash for each axis
const LAT_MULTIPLIER: u64 = 7;
const LNG_MULTIPLIER: u64 = 13;
const OFFSET_BUCKETS: u64 = 1000;

/// Attaches a point to every listing, synthesizing one when the listing
/// carries no usable coordinates.
///
/// Synthesized points are the district center plus a small offset derived
/// from the listing's name, so repeated calls for the same listing always
/// land on the same spot. Resolution never fails.
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    centers: AHashMap<String, GeoPoint>,
    default_center: GeoPoint,
    jitter_degrees: f64,
}

impl Default for CoordinateResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl CoordinateResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let mut centers: AHashMap<String, GeoPoint> = DISTRICT_CENTERS.iter()
            .map(|(name, point)| (name.to_string(), *point))
            .collect();
        for (name, (lat, lng)) in &config.districts {
            centers.insert(name.clone(), GeoPoint::new(*lat, *lng));
        }

        let default_center = match centers.get(config.default_district.as_str()) {
            Some(center) => *center,
            None => {
                warn!(
                    "Default district {} has no known center, using built-in fallback",
                    config.default_district
                );
                FALLBACK_CENTER
            }
        };

        Self {
            centers,
            default_center,
            jitter_degrees: config.jitter_degrees,
        }
    }

    /// Center used for a district, or the default district's center when unknown.
    pub fn district_center(&self, district: Option<&str>) -> GeoPoint {
        district
            .map(str::trim)
            .and_then(|name| self.centers.get(name))
            .copied()
            .unwrap_or(self.default_center)
    }

    pub fn is_known_district(&self, district: &str) -> bool {
        self.centers.contains_key(district.trim())
    }

    pub fn resolve(&self, listing: &Listing) -> GeoPoint {
        if let Some(point) = listing.explicit_point() {
            return point;
        }

        let district = listing.district.as_deref();
        if !district.map_or(false, |d| self.is_known_district(d)) {
            trace!("Listing {} has unknown district {:?}, using default center", listing.id, district);
        }
        let base = self.district_center(district);
        let (d_lat, d_lng) = self.offset_for(listing.identity_key());
        trace!("Synthesized coordinates for listing {} ({:+.5}, {:+.5})", listing.id, d_lat, d_lng);

        GeoPoint::new(base.latitude + d_lat, base.longitude + d_lng)
    }

    /// Deterministic offset in `[-jitter, +jitter)` for each axis.
    fn offset_for(&self, key: &str) -> (f64, f64) {
        let hash: u64 = key.chars().map(|c| c as u64).sum();
        let spread = |multiplier: u64| {
            let bucket = hash.wrapping_mul(multiplier) % OFFSET_BUCKETS;
            (bucket as f64 / OFFSET_BUCKETS as f64 - 0.5) * 2.0 * self.jitter_degrees
        };
        (spread(LAT_MULTIPLIER), spread(LNG_MULTIPLIER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_coordinates_win() {
        let resolver = CoordinateResolver::default();
        let listing = Listing::new("1", "은마").with_district("강남구").with_coordinates(37.49, 127.06);
        assert_eq!(resolver.resolve(&listing), GeoPoint::new(37.49, 127.06));
    }

    #[test]
    fn synthesized_point_is_stable_and_near_district() {
        let resolver = CoordinateResolver::default();
        let listing = Listing::new("7", "마포래미안푸르지오").with_district("마포구");
        let first = resolver.resolve(&listing);
        let second = resolver.resolve(&listing.clone());
        assert_eq!(first, second);

        let center = resolver.district_center(Some("마포구"));
        assert!((first.latitude - center.latitude).abs() <= 0.005);
        assert!((first.longitude - center.longitude).abs() <= 0.005);
    }

    #[test]
    fn different_names_get_different_offsets() {
        let resolver = CoordinateResolver::default();
        let a = resolver.resolve(&Listing::new("1", "헬리오시티").with_district("송파구"));
        let b = resolver.resolve(&Listing::new("2", "파크리오").with_district("송파구"));
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_district_uses_default_center() {
        let resolver = CoordinateResolver::default();
        let gangnam = resolver.district_center(Some("강남구"));
        assert_eq!(resolver.district_center(Some("해운대구")), gangnam);
        assert_eq!(resolver.district_center(None), gangnam);

        let point = resolver.resolve(&Listing::new("3", "마린시티").with_district("해운대구"));
        assert!((point.latitude - gangnam.latitude).abs() <= 0.005);
    }

    #[test]
    fn configured_districts_extend_table() {
        let mut config = ResolverConfig::default();
        config.districts.insert("분당구".to_string(), (37.3827, 127.1189));
        config.default_district = "분당구".to_string();
        let resolver = CoordinateResolver::new(&config);
        assert!(resolver.is_known_district("분당구"));
        assert_eq!(resolver.district_center(Some("없는구")), GeoPoint::new(37.3827, 127.1189));
    }

    #[test]
    fn unnamed_listings_fall_back_to_id() {
        let resolver = CoordinateResolver::default();
        let a = resolver.resolve(&Listing::new("1001", "").with_district("중구"));
        let b = resolver.resolve(&Listing::new("2002", "").with_district("중구"));
        assert_ne!(a, b);
    }
}
