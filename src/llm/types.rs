//! LLM response types: one typed shape per task kind.
//!
//! These mirror the schemas in schema.rs field for field. The gateway only
//! deserializes into them after the payload has passed schema validation.

use serde::{Deserialize, Serialize};

use super::schema::TaskKind;
use crate::error::GatewayError;

/// A suggested crop for given soil and climate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub crop: String,
    pub reason: String,
    pub expected_yield: String,
}

/// Location resolved from coordinates plus recommendations for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedRecommendations {
    pub location_name: String,
    pub climate_desc: String,
    pub recommendations: Vec<Recommendation>,
}

/// Short ratings extracted from a field photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmOverview {
    pub soil_quality: String,
    pub pest_risk: String,
    pub crop_health: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Diseased,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAnalysis {
    pub status: HealthStatus,
    pub diagnosis: String,
    pub severity: Severity,
    pub treatment: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PestRisk {
    pub pest: String,
    pub risk_level: RiskLevel,
    pub preventive_measures: Vec<String>,
}

/// Result of identifying a pest from a photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PestScan {
    pub pest_name: String,
    pub damage_description: String,
    pub solutions: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStep {
    pub stage: String,
    pub duration: String,
    pub instructions: Vec<String>,
    pub tips: String,
}

/// "Sell Now" / "Wait" advice with its reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAdvice {
    pub advice: String,
    pub reasoning: String,
}

/// Parsed, schema-validated output of one gateway call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum TaskResult {
    Recommendations(Vec<Recommendation>),
    LocatedRecommendations(LocatedRecommendations),
    FarmOverview(FarmOverview),
    DiseaseAnalysis(DiseaseAnalysis),
    PestRisks(Vec<PestRisk>),
    PestScan(PestScan),
    GrowthGuide(Vec<GrowthStep>),
    MarketAdvice(MarketAdvice),
}

impl TaskResult {
    /// Deserialize a validated payload into the shape for `kind`.
    pub fn decode(kind: TaskKind, value: serde_json::Value) -> Result<Self, GatewayError> {
        fn typed<T: serde::de::DeserializeOwned>(
            value: serde_json::Value,
        ) -> Result<T, GatewayError> {
            serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))
        }

        Ok(match kind {
            TaskKind::CropRecommendation => TaskResult::Recommendations(typed(value)?),
            TaskKind::AutoLocationRecommendation => {
                TaskResult::LocatedRecommendations(typed(value)?)
            }
            TaskKind::FarmOverview => TaskResult::FarmOverview(typed(value)?),
            TaskKind::DiseaseDetection => TaskResult::DiseaseAnalysis(typed(value)?),
            TaskKind::PestForecast => TaskResult::PestRisks(typed(value)?),
            TaskKind::PestVisual => TaskResult::PestScan(typed(value)?),
            TaskKind::GrowthGuide => TaskResult::GrowthGuide(typed(value)?),
            TaskKind::MarketAdvice => TaskResult::MarketAdvice(typed(value)?),
        })
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskResult::Recommendations(_) => TaskKind::CropRecommendation,
            TaskResult::LocatedRecommendations(_) => TaskKind::AutoLocationRecommendation,
            TaskResult::FarmOverview(_) => TaskKind::FarmOverview,
            TaskResult::DiseaseAnalysis(_) => TaskKind::DiseaseDetection,
            TaskResult::PestRisks(_) => TaskKind::PestForecast,
            TaskResult::PestScan(_) => TaskKind::PestVisual,
            TaskResult::GrowthGuide(_) => TaskKind::GrowthGuide,
            TaskResult::MarketAdvice(_) => TaskKind::MarketAdvice,
        }
    }
}

/// Extract one concrete output type from a `TaskResult`.
pub trait FromTaskResult: Sized {
    fn from_result(result: TaskResult) -> Result<Self, GatewayError>;
}

fn mismatch(expected: &str, got: &TaskResult) -> GatewayError {
    GatewayError::Malformed(format!(
        "expected {} result, got {}",
        expected,
        got.kind()
    ))
}

macro_rules! from_task_result {
    ($ty:ty, $variant:ident, $label:literal) => {
        impl FromTaskResult for $ty {
            fn from_result(result: TaskResult) -> Result<Self, GatewayError> {
                match result {
                    TaskResult::$variant(inner) => Ok(inner),
                    other => Err(mismatch($label, &other)),
                }
            }
        }
    };
}

from_task_result!(Vec<Recommendation>, Recommendations, "crop-recommendation");
from_task_result!(LocatedRecommendations, LocatedRecommendations, "auto-location-recommendation");
from_task_result!(FarmOverview, FarmOverview, "farm-overview");
from_task_result!(DiseaseAnalysis, DiseaseAnalysis, "disease-detection");
from_task_result!(Vec<PestRisk>, PestRisks, "pest-forecast");
from_task_result!(PestScan, PestScan, "pest-visual");
from_task_result!(Vec<GrowthStep>, GrowthGuide, "growth-guide");
from_task_result!(MarketAdvice, MarketAdvice, "market-advice");
