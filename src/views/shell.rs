//! Navigation Shell: which screen is showing, and the five controllers.
//!
//! The shell holds no AI data of its own. Leaving a screen resets that
//! screen's controller: its results are dropped and any reply still in
//! flight for it settles as stale.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::{lock, CropAdvisor, HealthScanner, MarketTrends, Overview, PestAlerts};
use crate::config::Settings;
use crate::error::GatewayError;
use crate::llm::{AiGateway, GeminiTransport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Dashboard,
    CropAdvisor,
    HealthScanner,
    MarketTrends,
    PestAlerts,
}

impl View {
    /// Sidebar order.
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::CropAdvisor,
        View::HealthScanner,
        View::MarketTrends,
        View::PestAlerts,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::CropAdvisor => "crop-rec",
            View::HealthScanner => "disease-det",
            View::MarketTrends => "market-trend",
            View::PestAlerts => "pest-alert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Overview",
            View::CropAdvisor => "Crop Advisor",
            View::HealthScanner => "Health Scan",
            View::MarketTrends => "Market Trends",
            View::PestAlerts => "Pest Alerts",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            View::Dashboard => "📊",
            View::CropAdvisor => "🌾",
            View::HealthScanner => "🔍",
            View::MarketTrends => "📈",
            View::PestAlerts => "🐛",
        }
    }

    /// Resolve a route id. Unknown ids fall back to the dashboard.
    pub fn from_id(id: &str) -> View {
        View::ALL
            .into_iter()
            .find(|v| v.id() == id)
            .unwrap_or_default()
    }
}

pub struct Shell {
    current: Mutex<View>,
    pub overview: Overview,
    pub crop_advisor: CropAdvisor,
    pub health_scanner: HealthScanner,
    pub market_trends: MarketTrends,
    pub pest_alerts: PestAlerts,
}

impl Shell {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            current: Mutex::new(View::default()),
            overview: Overview::new(gateway.clone()),
            crop_advisor: CropAdvisor::new(gateway.clone()),
            health_scanner: HealthScanner::new(gateway.clone()),
            market_trends: MarketTrends::new(gateway.clone()),
            pest_alerts: PestAlerts::new(gateway),
        }
    }

    /// Shell backed by Gemini, configured from the settings file and env.
    pub fn from_env() -> Result<Self, GatewayError> {
        let settings = Settings::load();
        let transport = GeminiTransport::new(settings)?;
        Ok(Self::new(Arc::new(AiGateway::new(Arc::new(transport)))))
    }

    pub fn current(&self) -> View {
        *lock(&self.current)
    }

    pub fn navigate(&self, to: View) {
        let from = {
            let mut current = lock(&self.current);
            std::mem::replace(&mut *current, to)
        };
        if from == to {
            return;
        }
        log::info!("[SHELL] {} -> {}", from.id(), to.id());
        self.reset(from);
    }

    pub fn navigate_to_id(&self, id: &str) {
        self.navigate(View::from_id(id));
    }

    fn reset(&self, view: View) {
        match view {
            View::Dashboard => self.overview.reset(),
            View::CropAdvisor => self.crop_advisor.reset(),
            View::HealthScanner => self.health_scanner.reset(),
            View::MarketTrends => self.market_trends.reset(),
            View::PestAlerts => self.pest_alerts.reset(),
        }
    }
}
