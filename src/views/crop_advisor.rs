//! Crop Advisor screen.
//!
//! Two independent flows fill the same result area:
//!   - manual: soil type + region + climate typed by the farmer
//!   - auto-detect: geolocation, with region and climate resolved by the model
//!
//! Each flow has its own `Slot`, so a pending manual request is never ended
//! by an auto-detect reply (or the other way round). The cards on screen come
//! from whichever flow succeeded last. A growth guide can be opened from any
//! card; only one guide is open at a time.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::state::{Failure, Phase, Settlement, Slot};
use super::{lock, settle_call};
use crate::capture::LocationSource;
use crate::error::TaskError;
use crate::llm::prompts::{build_prompt, TaskInput};
use crate::llm::types::{GrowthStep, LocatedRecommendations, Recommendation};
use crate::llm::AiGateway;

pub const LOCATION_DENIED: &str = "Location access denied or unavailable.";
pub const DETECT_FAILED: &str = "Failed to detect location or climate. Please enter manually.";
pub const DEFAULT_SOIL: &str = "Loamy";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropForm {
    pub soil_type: String,
    pub region: String,
    pub climate: String,
}

impl Default for CropForm {
    fn default() -> Self {
        Self {
            soil_type: DEFAULT_SOIL.to_string(),
            region: String::new(),
            climate: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLocation {
    pub name: String,
    pub climate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shown {
    pub recommendations: Vec<Recommendation>,
    pub detected: Option<DetectedLocation>,
}

/// The open growth-guide popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideView {
    pub crop: String,
    pub steps: Vec<GrowthStep>,
}

pub struct CropAdvisor {
    gateway: Arc<AiGateway>,
    form: Mutex<CropForm>,
    manual: Slot<Vec<Recommendation>>,
    auto: Slot<LocatedRecommendations>,
    guide: Slot<Vec<GrowthStep>>,
    shown: Mutex<Shown>,
}

impl CropAdvisor {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            form: Mutex::new(CropForm::default()),
            manual: Slot::new(),
            auto: Slot::new(),
            guide: Slot::new(),
            shown: Mutex::new(Shown::default()),
        }
    }

    pub fn form(&self) -> CropForm {
        lock(&self.form).clone()
    }

    pub fn set_soil_type(&self, soil_type: &str) {
        lock(&self.form).soil_type = soil_type.to_string();
    }

    pub fn set_region(&self, region: &str) {
        lock(&self.form).region = region.to_string();
    }

    pub fn set_climate(&self, climate: &str) {
        lock(&self.form).climate = climate.to_string();
    }

    /// Recommend crops from the form as typed.
    pub async fn recommend(&self) -> Settlement {
        let form = self.form();
        let ticket = self.manual.begin();
        lock(&self.shown).detected = None;

        let prompt = build_prompt(&TaskInput::CropRecommendation {
            soil_type: form.soil_type,
            region: form.region,
            climate: form.climate,
        });
        let result = self.gateway.run::<Vec<Recommendation>>(&prompt).await;

        let fresh = result.as_ref().ok().cloned();
        let settlement = settle_call(&self.manual, ticket, result);
        if let (Settlement::Applied, Some(recommendations)) = (settlement, fresh) {
            log::info!("[VIEW] {} manual recommendations", recommendations.len());
            lock(&self.shown).recommendations = recommendations;
        }
        settlement
    }

    /// Locate the farmer, let the model resolve region and climate, and
    /// recommend crops for the current soil type.
    pub async fn auto_detect(&self, location: &dyn LocationSource) -> Settlement {
        let ticket = self.auto.begin();

        let coordinates = match location.locate().await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("[VIEW] Geolocation failed: {}", e);
                return self.auto.settle(
                    ticket,
                    Err(Failure::with_message(TaskError::from(e), LOCATION_DENIED)),
                );
            }
        };

        let soil_type = lock(&self.form).soil_type.clone();
        let prompt = build_prompt(&TaskInput::AutoLocation {
            coordinates,
            soil_type,
        });
        let result = self
            .gateway
            .run::<LocatedRecommendations>(&prompt)
            .await
            .map_err(|e| Failure::with_message(e.into(), DETECT_FAILED));

        let fresh = result.as_ref().ok().cloned();
        let settlement = self.auto.settle(ticket, result);
        if let (Settlement::Applied, Some(located)) = (settlement, fresh) {
            log::info!("[VIEW] Detected location: {}", located.location_name);
            {
                let mut form = lock(&self.form);
                form.region = located.location_name.clone();
                form.climate = located.climate_desc.clone();
            }
            *lock(&self.shown) = Shown {
                recommendations: located.recommendations,
                detected: Some(DetectedLocation {
                    name: located.location_name,
                    climate: located.climate_desc,
                }),
            };
        }
        settlement
    }

    /// Cards currently on screen.
    pub fn shown(&self) -> Shown {
        lock(&self.shown).clone()
    }

    pub fn manual_phase(&self) -> Phase<Vec<Recommendation>> {
        self.manual.phase()
    }

    pub fn auto_phase(&self) -> Phase<LocatedRecommendations> {
        self.auto.phase()
    }

    /// Both triggers are disabled while either flow is pending.
    pub fn can_trigger(&self) -> bool {
        !self.manual.is_pending() && !self.auto.is_pending()
    }

    pub async fn open_guide(&self, crop: &str) -> Settlement {
        let ticket = self.guide.begin_keyed(crop);
        let result = self
            .gateway
            .run::<Vec<GrowthStep>>(&build_prompt(&TaskInput::GrowthGuide {
                crop: crop.to_string(),
            }))
            .await;
        settle_call(&self.guide, ticket, result)
    }

    pub fn close_guide(&self) {
        self.guide.reset();
    }

    /// Crop whose guide is loading, if any.
    pub fn guide_loading(&self) -> Option<String> {
        if self.guide.is_pending() {
            self.guide.key()
        } else {
            None
        }
    }

    pub fn active_guide(&self) -> Option<GuideView> {
        let steps = self.guide.value()?;
        let crop = self.guide.key()?;
        Some(GuideView { crop, steps })
    }

    pub fn guide_failure(&self) -> Option<Failure> {
        self.guide.failure()
    }

    pub fn reset(&self) {
        self.manual.reset();
        self.auto.reset();
        self.guide.reset();
        *lock(&self.form) = CropForm::default();
        *lock(&self.shown) = Shown::default();
    }
}
