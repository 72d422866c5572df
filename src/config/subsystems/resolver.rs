// src/config/subsystems/resolver.rs

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// District whose center is used when a listing's district is unknown
    pub default_district: String,
    /// Half-width of the synthesized offset window, in degrees
    pub jitter_degrees: f64,
    /// Extra or overriding district centers, as (latitude, longitude)
    pub districts: BTreeMap<String, (f64, f64)>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_district: "강남구".to_string(),
            jitter_degrees: 0.005,
            districts: BTreeMap::new(),
        }
    }
}

fn parse_lat_lng(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
    valid.then_some((lat, lng))
}

impl FromIni for ResolverConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        let value = value.trim_matches('"');
        match (section_name, key) {
            ("resolver", "default_district") => {
                if value.is_empty() {
                    return Some(Err(Error::Config("default_district must not be empty".to_string())));
                }
                self.default_district = value.to_string();
                Some(Ok(()))
            },
            ("resolver", "jitter_degrees") => {
                match value.parse::<f64>() {
                    Ok(deg) if (0.0..=0.1).contains(&deg) => {
                        self.jitter_degrees = deg;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid jitter_degrees (must be between 0 and 0.1): {}", value)
                    ))),
                }
            },
            ("resolver.districts", name) => {
                match parse_lat_lng(value) {
                    Some(center) => {
                        self.districts.insert(name.trim_matches('"').to_string(), center);
                        Some(Ok(()))
                    },
                    None => Some(Err(Error::Config(
                        format!("Invalid district center for {} (expected lat,lng): {}", name, value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_district.trim().is_empty() {
            return Err(Error::Config("default_district must not be empty".to_string()));
        }
        if !(0.0..=0.1).contains(&self.jitter_degrees) {
            return Err(Error::Config("jitter_degrees must be between 0 and 0.1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_district_centers() {
        assert_eq!(parse_lat_lng("37.5, 127.0"), Some((37.5, 127.0)));
        assert_eq!(parse_lat_lng("137.5, 127.0"), None);
        assert_eq!(parse_lat_lng("37.5"), None);
        assert_eq!(parse_lat_lng("north, east"), None);
    }

    #[test]
    fn rejects_bad_district_entry() {
        let mut config = ResolverConfig::default();
        let result = config.from_ini_section("resolver.districts", "수정구", "somewhere");
        assert!(matches!(result, Some(Err(_))));
        assert!(config.districts.is_empty());
    }
}
