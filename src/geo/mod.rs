pub mod distance;
pub mod resolver;

pub use self::distance::{haversine_km, EARTH_RADIUS_KM};
pub use self::resolver::CoordinateResolver;
