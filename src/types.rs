use serde::{Serialize, Deserialize};

/// A numeric field as it arrives from the listing feed.
///
/// Feeds mix JSON numbers and free-form strings ("3억 5,000", "", "협의")
/// in the same field, so both are accepted at deserialization time and
/// interpreted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Sale,
    Jeonse,
    Monthly,
}

/// A `[min, max]` price range in 만원 (10,000 KRW). Either bound may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<RawNumber>,
    #[serde(default)]
    pub max: Option<RawNumber>,
}

impl PriceRange {
    pub fn new<L: Into<RawNumber>, H: Into<RawNumber>>(min: L, max: H) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn single<V: Into<RawNumber>>(value: V) -> Self {
        Self {
            min: Some(value.into()),
            max: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// An immutable real-estate listing as delivered by the map client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub sub_district: Option<String>,
    #[serde(default)]
    pub latitude: Option<RawNumber>,
    #[serde(default)]
    pub longitude: Option<RawNumber>,
    #[serde(default, skip_serializing_if = "PriceRange::is_empty")]
    pub sale: PriceRange,
    #[serde(default, skip_serializing_if = "PriceRange::is_empty")]
    pub jeonse: PriceRange,
    #[serde(default, skip_serializing_if = "PriceRange::is_empty")]
    pub monthly: PriceRange,
}

impl Listing {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            district: None,
            sub_district: None,
            latitude: None,
            longitude: None,
            sale: PriceRange::default(),
            jeonse: PriceRange::default(),
            monthly: PriceRange::default(),
        }
    }

    pub fn with_region<D: Into<String>, S: Into<String>>(mut self, district: D, sub_district: S) -> Self {
        self.district = Some(district.into());
        self.sub_district = Some(sub_district.into());
        self
    }

    pub fn with_district<D: Into<String>>(mut self, district: D) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(RawNumber::Number(latitude));
        self.longitude = Some(RawNumber::Number(longitude));
        self
    }

    pub fn with_price(mut self, kind: TransactionType, range: PriceRange) -> Self {
        match kind {
            TransactionType::Sale => self.sale = range,
            TransactionType::Jeonse => self.jeonse = range,
            TransactionType::Monthly => self.monthly = range,
        }
        self
    }

    pub fn price_range(&self, kind: TransactionType) -> &PriceRange {
        match kind {
            TransactionType::Sale => &self.sale,
            TransactionType::Jeonse => &self.jeonse,
            TransactionType::Monthly => &self.monthly,
        }
    }

    /// Explicit coordinates, if both are present, numeric and finite.
    pub fn explicit_point(&self) -> Option<GeoPoint> {
        match (&self.latitude, &self.longitude) {
            (Some(RawNumber::Number(lat)), Some(RawNumber::Number(lng)))
                if lat.is_finite() && lng.is_finite() =>
            {
                Some(GeoPoint::new(*lat, *lng))
            }
            _ => None,
        }
    }

    /// Key used to seed synthesized coordinates. Falls back to the id for unnamed listings.
    pub fn identity_key(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A resolved latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Arithmetic mean of the given points. `None` for an empty slice.
    pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }
        if points.len() == 1 {
            return Some(points[0]);
        }
        let n = points.len() as f64;
        let (lat_sum, lng_sum) = points.iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));
        Some(GeoPoint::new(lat_sum / n, lng_sum / n))
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            north: point.latitude,
            south: point.latitude,
            east: point.longitude,
            west: point.longitude,
        }
    }

    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for p in rest {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.north = self.north.max(point.latitude);
        self.south = self.south.min(point.latitude);
        self.east = self.east.max(point.longitude);
        self.west = self.west.min(point.longitude);
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.south && point.latitude <= self.north
            && point.longitude >= self.west && point.longitude <= self.east
    }
}
