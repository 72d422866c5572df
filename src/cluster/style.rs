use serde::{Serialize, Deserialize};
use crate::config::subsystems::StylingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    Single,
    Small,
    Medium,
    Large,
    XLarge,
}

impl SizeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Single => "single",
            SizeTier::Small => "small",
            SizeTier::Medium => "medium",
            SizeTier::Large => "large",
            SizeTier::XLarge => "xlarge",
        }
    }

    /// Marker diameter in pixels
    pub fn diameter_px(&self) -> u32 {
        match self {
            SizeTier::Single => 32,
            SizeTier::Small => 40,
            SizeTier::Medium => 48,
            SizeTier::Large => 56,
            SizeTier::XLarge => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    NoData,
    Affordable,
    Mid,
    High,
    Expensive,
}

impl PriceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceBand::NoData => "no_data",
            PriceBand::Affordable => "affordable",
            PriceBand::Mid => "mid",
            PriceBand::High => "high",
            PriceBand::Expensive => "expensive",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PriceBand::NoData => "#9E9E9E",
            PriceBand::Affordable => "#4CAF50",
            PriceBand::Mid => "#2196F3",
            PriceBand::High => "#FF9800",
            PriceBand::Expensive => "#F44336",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterStyle {
    pub size_tier: SizeTier,
    pub price_band: PriceBand,
}

/// Pure mapping from (member count, representative price) to display tiers.
#[derive(Debug, Clone, Default)]
pub struct ClusterStyler {
    config: StylingConfig,
}

impl ClusterStyler {
    pub fn new(config: StylingConfig) -> Self {
        Self { config }
    }

    pub fn size_tier(&self, member_count: usize) -> SizeTier {
        match member_count {
            0 | 1 => SizeTier::Single,
            n if n < self.config.small_max => SizeTier::Small,
            n if n < self.config.medium_max => SizeTier::Medium,
            n if n < self.config.large_max => SizeTier::Large,
            _ => SizeTier::XLarge,
        }
    }

    pub fn price_band(&self, price: Option<f64>) -> PriceBand {
        match price {
            Some(p) if p.is_finite() && p > 0.0 => {
                if p < self.config.affordable_max {
                    PriceBand::Affordable
                } else if p < self.config.mid_max {
                    PriceBand::Mid
                } else if p < self.config.high_max {
                    PriceBand::High
                } else {
                    PriceBand::Expensive
                }
            }
            _ => PriceBand::NoData,
        }
    }

    pub fn style(&self, member_count: usize, price: Option<f64>) -> ClusterStyle {
        ClusterStyle {
            size_tier: self.size_tier(member_count),
            price_band: self.price_band(price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tier_boundaries() {
        let styler = ClusterStyler::default();
        let expected = [
            (1, SizeTier::Single),
            (2, SizeTier::Small),
            (9, SizeTier::Small),
            (10, SizeTier::Medium),
            (49, SizeTier::Medium),
            (50, SizeTier::Large),
            (99, SizeTier::Large),
            (100, SizeTier::XLarge),
            (5000, SizeTier::XLarge),
        ];
        for (count, tier) in expected {
            assert_eq!(styler.size_tier(count), tier, "count {}", count);
        }
    }

    #[test]
    fn price_bands() {
        let styler = ClusterStyler::default();
        assert_eq!(styler.price_band(None), PriceBand::NoData);
        assert_eq!(styler.price_band(Some(f64::NAN)), PriceBand::NoData);
        assert_eq!(styler.price_band(Some(30_000.0)), PriceBand::Affordable);
        assert_eq!(styler.price_band(Some(50_000.0)), PriceBand::Mid);
        assert_eq!(styler.price_band(Some(150_000.0)), PriceBand::High);
        assert_eq!(styler.price_band(Some(200_000.0)), PriceBand::Expensive);
    }

    #[test]
    fn styling_is_pure() {
        let styler = ClusterStyler::default();
        for count in [1usize, 7, 42, 77, 300] {
            for price in [None, Some(1.0), Some(75_000.0), Some(1e9)] {
                assert_eq!(styler.style(count, price), styler.style(count, price));
            }
        }
    }

    #[test]
    fn tiers_expose_rendering_hints() {
        assert_eq!(SizeTier::XLarge.diameter_px(), 64);
        assert_eq!(PriceBand::NoData.color(), "#9E9E9E");
        assert_eq!(SizeTier::XLarge.as_str(), "xlarge");
    }
}
