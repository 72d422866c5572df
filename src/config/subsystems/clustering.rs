// src/config/subsystems/clustering.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    // Zoom levels at or above this value use regional aggregation
    pub far_zoom_threshold: i32,
    pub far_distance_km: f64,
    pub far_min_cluster_size: usize,
    pub near_distance_km: f64,
    pub near_min_cluster_size: usize,
    /// Above this zoom an undersized proximity group is still kept whole.
    /// `None` disables the override.
    pub undersized_override_zoom: Option<i32>,
    /// Run the proximity pass for each district on the rayon pool
    pub parallel_districts: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            far_zoom_threshold: 5,
            far_distance_km: 0.02,
            far_min_cluster_size: 1,
            near_distance_km: 0.0,
            near_min_cluster_size: 1,
            undersized_override_zoom: Some(14),
            parallel_districts: false,
        }
    }
}

fn parse_distance(key: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(km) if km.is_finite() && km >= 0.0 => Ok(km),
        _ => Err(Error::Config(
            format!("Invalid {} (must be a non-negative number of km): {}", key, value)
        )),
    }
}

fn parse_min_size(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::Config(
            format!("Invalid {} (must be > 0): {}", key, value)
        )),
    }
}

impl FromIni for ClusteringConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "clustering" {
            return None;
        }

        let value = value.trim_matches('"');
        let result = match key {
            "far_zoom_threshold" => match value.parse::<i32>() {
                Ok(zoom) => {
                    self.far_zoom_threshold = zoom;
                    Ok(())
                },
                Err(_) => Err(Error::Config(format!("Invalid far_zoom_threshold: {}", value))),
            },
            "far_distance_km" => parse_distance(key, value).map(|km| self.far_distance_km = km),
            "near_distance_km" => parse_distance(key, value).map(|km| self.near_distance_km = km),
            "far_min_cluster_size" => parse_min_size(key, value).map(|n| self.far_min_cluster_size = n),
            "near_min_cluster_size" => parse_min_size(key, value).map(|n| self.near_min_cluster_size = n),
            "undersized_override_zoom" => {
                if value.eq_ignore_ascii_case("none") || value.is_empty() {
                    self.undersized_override_zoom = None;
                    Ok(())
                } else {
                    match value.parse::<i32>() {
                        Ok(zoom) => {
                            self.undersized_override_zoom = Some(zoom);
                            Ok(())
                        },
                        Err(_) => Err(Error::Config(
                            format!("Invalid undersized_override_zoom (integer or none): {}", value)
                        )),
                    }
                }
            },
            "parallel_districts" => match value.parse::<bool>() {
                Ok(flag) => {
                    self.parallel_districts = flag;
                    Ok(())
                },
                Err(_) => Err(Error::Config(
                    format!("Invalid parallel_districts (must be true or false): {}", value)
                )),
            },
            // Unknown key
            _ => return None,
        };
        Some(result)
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.far_distance_km.is_finite() && self.far_distance_km >= 0.0) {
            return Err(Error::Config("far_distance_km must be a non-negative number".to_string()));
        }
        if !(self.near_distance_km.is_finite() && self.near_distance_km >= 0.0) {
            return Err(Error::Config("near_distance_km must be a non-negative number".to_string()));
        }
        if self.far_min_cluster_size == 0 || self.near_min_cluster_size == 0 {
            return Err(Error::Config("minimum cluster sizes must be greater than 0".to_string()));
        }
        Ok(())
    }
}
