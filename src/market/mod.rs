//! Market reference data: pre-seeded Mandi price history.
//!
//! Read-only. Feeds the market-advice prompt and the price chart.
//! Prices are in Indian Rupees per quintal.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: &'static str,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Month-over-month change of the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub trend: Trend,
    pub percent: f64,
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.trend {
            Trend::Up => '↑',
            Trend::Down => '↓',
            Trend::Flat => '↔',
        };
        write!(f, "{} {:.1}%", arrow, self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropMarket {
    pub crop: &'static str,
    pub price: u32,
    pub change: PriceChange,
    pub history: [PricePoint; 6],
}

impl CropMarket {
    /// Render the history as `"Jan 25: ₹2100, Feb 25: ₹2250, ..."`.
    pub fn history_line(&self) -> String {
        self.history
            .iter()
            .map(|p| format!("{}: ₹{}", p.date, p.price))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const MONTHS: [&str; 6] = ["Jan 25", "Feb 25", "Mar 25", "Apr 25", "May 25", "Jun 25"];

const fn series(prices: [u32; 6]) -> [PricePoint; 6] {
    let mut points = [PricePoint { date: "", price: 0 }; 6];
    let mut i = 0;
    while i < points.len() {
        points[i] = PricePoint {
            date: MONTHS[i],
            price: prices[i],
        };
        i += 1;
    }
    points
}

const fn crop(
    crop: &'static str,
    price: u32,
    trend: Trend,
    percent: f64,
    prices: [u32; 6],
) -> CropMarket {
    CropMarket {
        crop,
        price,
        change: PriceChange { trend, percent },
        history: series(prices),
    }
}

pub const CROPS: [CropMarket; 7] = [
    crop("Maize", 2450, Trend::Down, 2.1, [2100, 2250, 2180, 2350, 2450, 2400]),
    crop("Rice", 3800, Trend::Up, 4.5, [3200, 3400, 3550, 3600, 3750, 3800]),
    crop("Wheat", 2125, Trend::Up, 1.2, [1950, 2000, 2050, 2100, 2110, 2125]),
    crop("Cotton", 7200, Trend::Up, 5.8, [6500, 6700, 6850, 6900, 7100, 7200]),
    crop("Sugarcane", 315, Trend::Flat, 0.0, [315, 315, 315, 315, 315, 315]),
    crop("Soybean", 4600, Trend::Down, 1.5, [4800, 4750, 4700, 4650, 4620, 4600]),
    crop("Mustard", 5400, Trend::Up, 2.3, [5100, 5200, 5250, 5300, 5350, 5400]),
];

pub const DEFAULT_CROP: &str = "Maize";

/// Look up a crop by exact name.
pub fn lookup(crop: &str) -> Option<&'static CropMarket> {
    CROPS.iter().find(|c| c.crop == crop)
}

pub fn crop_names() -> Vec<&'static str> {
    CROPS.iter().map(|c| c.crop).collect()
}
