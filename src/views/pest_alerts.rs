//! Pest Alerts screen.
//!
//! Two tabs with their own request state: a text forecast from crop and
//! weather, and a visual scan of a photo. Switching tabs never touches the
//! other tab's request.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::state::{Failure, Phase, Settlement, Slot};
use super::{lock, settle_call, Badge};
use crate::capture::ImagePayload;
use crate::error::TaskError;
use crate::llm::prompts::{build_prompt, TaskInput};
use crate::llm::types::{PestRisk, PestScan};
use crate::llm::AiGateway;

pub const NO_RISKS: &str = "No active risk reports. Keep conditions monitored.";
pub const DEFAULT_CROP_TYPE: &str = "Corn/Maize";
pub const DEFAULT_WEATHER: &str = "Humid, 28°C, occasional rain";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Forecast,
    Visual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PestForm {
    pub crop_type: String,
    pub weather: String,
}

impl Default for PestForm {
    fn default() -> Self {
        Self {
            crop_type: DEFAULT_CROP_TYPE.to_string(),
            weather: DEFAULT_WEATHER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCard {
    pub risk: PestRisk,
    pub badge: Badge,
}

/// What the forecast tab renders once a forecast has come back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ForecastView {
    Risks { cards: Vec<RiskCard> },
    Empty { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanView {
    pub scan: PestScan,
    pub badge: Badge,
}

pub struct PestAlerts {
    gateway: Arc<AiGateway>,
    tab: Mutex<Tab>,
    form: Mutex<PestForm>,
    image: Mutex<Option<ImagePayload>>,
    forecast: Slot<Vec<PestRisk>>,
    visual: Slot<PestScan>,
}

impl PestAlerts {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            tab: Mutex::new(Tab::default()),
            form: Mutex::new(PestForm::default()),
            image: Mutex::new(None),
            forecast: Slot::new(),
            visual: Slot::new(),
        }
    }

    pub fn tab(&self) -> Tab {
        *lock(&self.tab)
    }

    pub fn set_tab(&self, tab: Tab) {
        *lock(&self.tab) = tab;
    }

    pub fn form(&self) -> PestForm {
        lock(&self.form).clone()
    }

    pub fn set_crop_type(&self, crop_type: &str) {
        lock(&self.form).crop_type = crop_type.to_string();
    }

    pub fn set_weather(&self, weather: &str) {
        lock(&self.form).weather = weather.to_string();
    }

    pub async fn check_risks(&self) -> Settlement {
        let form = self.form();
        let ticket = self.forecast.begin();
        let result = self
            .gateway
            .run::<Vec<PestRisk>>(&build_prompt(&TaskInput::PestForecast {
                crop_type: form.crop_type,
                weather: form.weather,
            }))
            .await;
        settle_call(&self.forecast, ticket, result)
    }

    /// Replace the photo for the visual tab, dropping any previous scan.
    pub fn select_image(&self, bytes: Vec<u8>) -> Result<(), TaskError> {
        self.visual.reset();
        let payload = ImagePayload::from_bytes(bytes);
        let mut image = lock(&self.image);
        match payload {
            Ok(p) => {
                *image = Some(p);
                Ok(())
            }
            Err(e) => {
                log::warn!("[VIEW] Rejected pest image: {}", e);
                *image = None;
                Err(e.into())
            }
        }
    }

    pub fn has_image(&self) -> bool {
        lock(&self.image).is_some()
    }

    pub async fn scan_image(&self) -> Settlement {
        let Some(image) = lock(&self.image).clone() else {
            return Settlement::Skipped;
        };
        let ticket = self.visual.begin();
        let result = self
            .gateway
            .run::<PestScan>(&build_prompt(&TaskInput::PestVisual { image }))
            .await;
        settle_call(&self.visual, ticket, result)
    }

    pub fn forecast_phase(&self) -> Phase<Vec<PestRisk>> {
        self.forecast.phase()
    }

    pub fn visual_phase(&self) -> Phase<PestScan> {
        self.visual.phase()
    }

    pub fn forecast_failure(&self) -> Option<Failure> {
        self.forecast.failure()
    }

    pub fn visual_failure(&self) -> Option<Failure> {
        self.visual.failure()
    }

    /// `None` until a forecast has succeeded.
    pub fn forecast_view(&self) -> Option<ForecastView> {
        let risks = self.forecast.value()?;
        if risks.is_empty() {
            return Some(ForecastView::Empty { message: NO_RISKS });
        }
        let cards = risks
            .into_iter()
            .map(|risk| RiskCard {
                badge: risk.risk_level.into(),
                risk,
            })
            .collect();
        Some(ForecastView::Risks { cards })
    }

    pub fn scan_view(&self) -> Option<ScanView> {
        self.visual.value().map(|scan| ScanView {
            badge: scan.risk_level.into(),
            scan,
        })
    }

    pub fn reset(&self) {
        self.forecast.reset();
        self.visual.reset();
        *lock(&self.tab) = Tab::default();
        *lock(&self.form) = PestForm::default();
        *lock(&self.image) = None;
    }
}
