//! Overview screen: farm photo scan, stat cards and tool shortcuts.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::shell::View;
use super::state::{Failure, Phase, Settlement, Slot, Ticket};
use crate::capture::{ImagePayload, ImageSource};
use crate::error::TaskError;
use crate::llm::prompts::{build_prompt, TaskInput};
use crate::llm::types::FarmOverview;
use crate::llm::AiGateway;

pub const SCAN_FAILED: &str = "Failed to analyze image. Please try again.";
pub const DEFAULT_SUMMARY: &str = "Scan your farm to get today's analysis.";
pub const NOT_SCANNED: &str = "Not Scanned";
const MARKET_OUTLOOK: &str = "Bullish";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToolCard {
    pub view: View,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const TOOLS: [ToolCard; 4] = [
    ToolCard {
        view: View::CropAdvisor,
        title: "Climate & Crop",
        description: "Predict best crops for upcoming weather.",
        icon: "🌦️",
    },
    ToolCard {
        view: View::HealthScanner,
        title: "Disease Detection",
        description: "Scan leaves to identify deficiencies.",
        icon: "🧬",
    },
    ToolCard {
        view: View::MarketTrends,
        title: "Price Forecasting",
        description: "Know when to sell for max profit.",
        icon: "💰",
    },
    ToolCard {
        view: View::PestAlerts,
        title: "Pest Prevention",
        description: "Early warning and risk assessment.",
        icon: "🐛",
    },
];

pub struct Overview {
    gateway: Arc<AiGateway>,
    scan: Slot<FarmOverview>,
    // Last successful scan; a later failure keeps showing it.
    latest: Mutex<Option<FarmOverview>>,
}

impl Overview {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            scan: Slot::new(),
            latest: Mutex::new(None),
        }
    }

    /// Pick a farm photo and rate soil, pests and crop health from it.
    pub async fn scan_farm(&self, source: &dyn ImageSource) -> Settlement {
        let bytes = match source.pick().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Settlement::Skipped,
            Err(e) => {
                log::warn!("[VIEW] Overview image unavailable: {}", e);
                let ticket = self.scan.begin();
                return self.fail(ticket, e.into());
            }
        };

        let ticket = self.scan.begin();
        let image = match ImagePayload::from_bytes(bytes) {
            Ok(image) => image,
            Err(e) => return self.fail(ticket, e.into()),
        };

        let result = self
            .gateway
            .run::<FarmOverview>(&build_prompt(&TaskInput::FarmOverview { image }))
            .await
            .map_err(|e| Failure::with_message(e.into(), SCAN_FAILED));

        let fresh = result.as_ref().ok().cloned();
        let settlement = self.scan.settle(ticket, result);
        if let (Settlement::Applied, Some(overview)) = (settlement, fresh) {
            *super::lock(&self.latest) = Some(overview);
        }
        settlement
    }

    fn fail(&self, ticket: Ticket, error: TaskError) -> Settlement {
        self.scan
            .settle(ticket, Err(Failure::with_message(error, SCAN_FAILED)))
    }

    pub fn phase(&self) -> Phase<FarmOverview> {
        self.scan.phase()
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_pending()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.scan.failure()
    }

    pub fn summary(&self) -> String {
        match &*super::lock(&self.latest) {
            Some(o) => o.summary.clone(),
            None => DEFAULT_SUMMARY.to_string(),
        }
    }

    pub fn stats(&self) -> Vec<StatCard> {
        let latest = super::lock(&self.latest);
        let rated = |pick: fn(&FarmOverview) -> &String| rating(latest.as_ref(), pick);
        vec![
            StatCard {
                label: "Soil Quality",
                value: rated(|o| &o.soil_quality),
                icon: "🌱",
            },
            StatCard {
                label: "Market Outlook",
                value: MARKET_OUTLOOK.to_string(),
                icon: "📈",
            },
            StatCard {
                label: "Pest Risk",
                value: rated(|o| &o.pest_risk),
                icon: "🛡️",
            },
            StatCard {
                label: "Crop Health",
                value: rated(|o| &o.crop_health),
                icon: "🌾",
            },
        ]
    }

    pub fn tools(&self) -> &'static [ToolCard] {
        &TOOLS
    }

    pub fn reset(&self) {
        self.scan.reset();
        *super::lock(&self.latest) = None;
    }
}

fn rating(latest: Option<&FarmOverview>, pick: fn(&FarmOverview) -> &String) -> String {
    latest
        .map(|o| pick(o).clone())
        .unwrap_or_else(|| NOT_SCANNED.to_string())
}
