// src/config/subsystems/styling.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

/// Thresholds for the size and price tiers of a cluster marker.
///
/// Price bounds are in 만원 (10,000 KRW); a price below `affordable_max`
/// is affordable, below `mid_max` mid, below `high_max` high, and
/// expensive otherwise. Size bounds are exclusive upper member counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylingConfig {
    pub affordable_max: f64,
    pub mid_max: f64,
    pub high_max: f64,
    pub small_max: usize,
    pub medium_max: usize,
    pub large_max: usize,
}

impl Default for StylingConfig {
    fn default() -> Self {
        Self {
            affordable_max: 50_000.0,
            mid_max: 100_000.0,
            high_max: 200_000.0,
            small_max: 10,
            medium_max: 50,
            large_max: 100,
        }
    }
}

impl FromIni for StylingConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "styling" {
            return None;
        }

        let value = value.trim_matches('"').replace(',', "");
        let price_slot = match key {
            "affordable_max" => Some(&mut self.affordable_max),
            "mid_max" => Some(&mut self.mid_max),
            "high_max" => Some(&mut self.high_max),
            _ => None,
        };
        if let Some(slot) = price_slot {
            return match value.parse::<f64>() {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    *slot = price;
                    Some(Ok(()))
                },
                _ => Some(Err(Error::Config(
                    format!("Invalid {} (must be a positive price): {}", key, value)
                ))),
            };
        }

        let size_slot = match key {
            "small_max" => &mut self.small_max,
            "medium_max" => &mut self.medium_max,
            "large_max" => &mut self.large_max,
            _ => return None,
        };
        match value.parse::<usize>() {
            Ok(count) if count > 1 => {
                *size_slot = count;
                Some(Ok(()))
            },
            _ => Some(Err(Error::Config(
                format!("Invalid {} (must be > 1): {}", key, value)
            ))),
        }
    }
}

impl StylingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.affordable_max < self.mid_max && self.mid_max < self.high_max) {
            return Err(Error::Config(
                "price bands must satisfy affordable_max < mid_max < high_max".to_string()
            ));
        }
        if !(1 < self.small_max && self.small_max < self.medium_max && self.medium_max < self.large_max) {
            return Err(Error::Config(
                "size tiers must satisfy 1 < small_max < medium_max < large_max".to_string()
            ));
        }
        Ok(())
    }
}
