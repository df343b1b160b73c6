//! Health Scanner screen: leaf/soil photo in, diagnosis out.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::state::{Failure, Phase, Settlement, Slot};
use super::{lock, settle_call, Badge};
use crate::capture::ImagePayload;
use crate::error::TaskError;
use crate::llm::prompts::{build_prompt, TaskInput};
use crate::llm::types::DiseaseAnalysis;
use crate::llm::AiGateway;

/// Diagnosis plus the chip colour for its severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisView {
    pub analysis: DiseaseAnalysis,
    pub badge: Badge,
}

pub struct HealthScanner {
    gateway: Arc<AiGateway>,
    image: Mutex<Option<ImagePayload>>,
    analysis: Slot<DiseaseAnalysis>,
}

impl HealthScanner {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            image: Mutex::new(None),
            analysis: Slot::new(),
        }
    }

    /// Replace the selected photo. Any previous analysis is dropped.
    pub fn select_image(&self, bytes: Vec<u8>) -> Result<(), TaskError> {
        self.analysis.reset();
        let payload = ImagePayload::from_bytes(bytes);
        let mut image = lock(&self.image);
        match payload {
            Ok(p) => {
                *image = Some(p);
                Ok(())
            }
            Err(e) => {
                log::warn!("[VIEW] Rejected leaf image: {}", e);
                *image = None;
                Err(e.into())
            }
        }
    }

    pub fn has_image(&self) -> bool {
        lock(&self.image).is_some()
    }

    /// Diagnose the selected photo. Does nothing without one.
    pub async fn scan(&self) -> Settlement {
        let Some(image) = lock(&self.image).clone() else {
            return Settlement::Skipped;
        };
        let ticket = self.analysis.begin();
        let result = self
            .gateway
            .run::<DiseaseAnalysis>(&build_prompt(&TaskInput::DiseaseDetection { image }))
            .await;
        settle_call(&self.analysis, ticket, result)
    }

    pub fn phase(&self) -> Phase<DiseaseAnalysis> {
        self.analysis.phase()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.analysis.failure()
    }

    pub fn diagnosis(&self) -> Option<DiagnosisView> {
        self.analysis.value().map(|analysis| DiagnosisView {
            badge: analysis.severity.into(),
            analysis,
        })
    }

    pub fn reset(&self) {
        self.analysis.reset();
        *lock(&self.image) = None;
    }
}
