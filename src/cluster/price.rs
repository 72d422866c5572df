use lazy_static::lazy_static;
use log::trace;
use regex::Regex;
use serde::{Serialize, Deserialize};
use crate::types::{Listing, PriceRange, RawNumber, TransactionType};

lazy_static! {
    // "12억", "5억원", "3억5000", "3억5천", "9500만원" once commas and spaces are stripped
    static ref KOREAN_PRICE: Regex = Regex::new(
        r"^(?:(\d+(?:\.\d+)?)억(?:원$)?)?(?:(\d+(?:\.\d+)?)천)?(\d+(?:\.\d+)?)?(?:만원|만)?$"
    ).unwrap();
}

/// 만원 per 억
const MAN_PER_EOK: f64 = 10_000.0;
/// 만원 per 천만
const MAN_PER_CHEON: f64 = 1_000.0;

/// Parses a free-form price string into 만원. Zero or anything unparseable is absent.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let compact: String = text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let value = match compact.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            let caps = KOREAN_PRICE.captures(&compact)?;
            let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
            let (eok, cheon, man) = (part(1), part(2), part(3));
            if eok.is_none() && cheon.is_none() && man.is_none() {
                return None;
            }
            eok.unwrap_or(0.0) * MAN_PER_EOK
                + cheon.unwrap_or(0.0) * MAN_PER_CHEON
                + man.unwrap_or(0.0)
        }
    };

    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        trace!("Discarding non-positive price {:?}", text);
        None
    }
}

impl RawNumber {
    /// Usable positive amount, if any.
    pub fn amount(&self) -> Option<f64> {
        match self {
            RawNumber::Number(v) if v.is_finite() && *v > 0.0 => Some(*v),
            RawNumber::Number(_) => None,
            RawNumber::Text(text) => parse_price_text(text),
        }
    }
}

impl PriceRange {
    /// Mean of both bounds when present, otherwise whichever bound is usable.
    pub fn representative(&self) -> Option<f64> {
        let low = self.min.as_ref().and_then(RawNumber::amount);
        let high = self.max.as_ref().and_then(RawNumber::amount);
        match (low, high) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}

impl Listing {
    pub fn sale_price(&self) -> Option<f64> {
        self.sale.representative()
    }

    /// Jeonse deposit if known, else the monthly rent.
    pub fn rent_price(&self) -> Option<f64> {
        self.price_range(TransactionType::Jeonse).representative()
            .or_else(|| self.price_range(TransactionType::Monthly).representative())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    Sale,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepresentativePrice {
    pub value: f64,
    pub basis: PriceBasis,
}

/// Computes the single price shown on a cluster marker.
///
/// If any member has a sale price, the result is the mean sale price over
/// those members only. Otherwise it is the mean of whatever rent prices the
/// members carry. Members without a usable price never count toward the mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAggregator;

impl PriceAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate<'a, I>(&self, listings: I) -> Option<RepresentativePrice>
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let mut sale_sum = 0.0;
        let mut sale_count = 0usize;
        let mut other_sum = 0.0;
        let mut other_count = 0usize;

        for listing in listings {
            if let Some(price) = listing.sale_price() {
                sale_sum += price;
                sale_count += 1;
            } else if let Some(price) = listing.rent_price() {
                other_sum += price;
                other_count += 1;
            }
        }

        if sale_count > 0 {
            Some(RepresentativePrice {
                value: sale_sum / sale_count as f64,
                basis: PriceBasis::Sale,
            })
        } else if other_count > 0 {
            Some(RepresentativePrice {
                value: other_sum / other_count as f64,
                basis: PriceBasis::Rent,
            })
        } else {
            None
        }
    }
}

/// Marker label for a price in 만원: "3.5억", "12억", "9,500만", or "-" when absent.
pub fn format_price(price: Option<f64>) -> String {
    let man = match price {
        Some(v) if v.is_finite() && v > 0.0 => v.round(),
        _ => return "-".to_string(),
    };

    if man >= MAN_PER_EOK {
        let eok = (man / MAN_PER_EOK * 10.0).round() / 10.0;
        if eok.fract() == 0.0 {
            format!("{}억", eok as u64)
        } else {
            format!("{:.1}억", eok)
        }
    } else {
        let digits = (man as u64).to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        format!("{}만", grouped)
    }
}
