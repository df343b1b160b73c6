//! Prompt Builder: instruction text + schema for every task.
//!
//! These templates are the contract between the dashboard and the model.
//! Rendering is a pure substitution: the same input always produces the
//! same instruction text and the same schema reference.

use super::provider::ModelTier;
use super::schema::{schema_for, ResponseSchema, TaskKind};
use crate::capture::{Coordinates, ImagePayload};

const FARM_OVERVIEW_PROMPT: &str = "Analyze this agricultural photo (soil or crop). Provide 1-2 word ratings for: 'soilQuality', 'pestRisk', and 'cropHealth'. Also provide a short 1-sentence 'summary' of current status.";

const DISEASE_DETECTION_PROMPT: &str = "Analyze this plant leaf or soil image. Detect any diseases or nutrient deficiencies. Provide diagnosis, severity, and suggested treatments.";

const PEST_VISUAL_PROMPT: &str = "Analyze this image for agricultural pests or crop damage. Identify the pest/problem, describe the damage, and provide specific biological or chemical solutions.";

/// Typed inputs for one task. Image tasks carry their image by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskInput {
    CropRecommendation {
        soil_type: String,
        region: String,
        climate: String,
    },
    AutoLocation {
        coordinates: Coordinates,
        soil_type: String,
    },
    FarmOverview {
        image: ImagePayload,
    },
    DiseaseDetection {
        image: ImagePayload,
    },
    PestForecast {
        crop_type: String,
        weather: String,
    },
    PestVisual {
        image: ImagePayload,
    },
    GrowthGuide {
        crop: String,
    },
    MarketAdvice {
        price_history: String,
    },
}

impl TaskInput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskInput::CropRecommendation { .. } => TaskKind::CropRecommendation,
            TaskInput::AutoLocation { .. } => TaskKind::AutoLocationRecommendation,
            TaskInput::FarmOverview { .. } => TaskKind::FarmOverview,
            TaskInput::DiseaseDetection { .. } => TaskKind::DiseaseDetection,
            TaskInput::PestForecast { .. } => TaskKind::PestForecast,
            TaskInput::PestVisual { .. } => TaskKind::PestVisual,
            TaskInput::GrowthGuide { .. } => TaskKind::GrowthGuide,
            TaskInput::MarketAdvice { .. } => TaskKind::MarketAdvice,
        }
    }
}

/// Everything the gateway needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub kind: TaskKind,
    pub instruction: String,
    pub schema: &'static ResponseSchema,
    pub image: Option<ImagePayload>,
    /// Let the backing service use live web search (auto-location only).
    pub grounding: bool,
    pub tier: ModelTier,
}

/// Render the instruction for a task and pair it with its schema.
pub fn build_prompt(input: &TaskInput) -> PromptRequest {
    let kind = input.kind();
    let mut image = None;
    let mut grounding = false;
    let mut tier = ModelTier::Fast;

    let instruction = match input {
        TaskInput::CropRecommendation {
            soil_type,
            region,
            climate,
        } => format!(
            "Based on soil type: {soil_type}, region: {region}, and current climate: {climate}, suggest 3 most suitable crops for a farmer."
        ),
        TaskInput::AutoLocation {
            coordinates,
            soil_type,
        } => {
            grounding = true;
            format!(
                r#"The user is at coordinates: latitude {lat}, longitude {lng}.
1. Identify the city/region name for these coordinates.
2. Search for the CURRENT weather and local climate patterns for this specific area.
3. Given the soil type "{soil_type}", recommend 3 crops.
Return the data in a structured JSON format."#,
                lat = coordinates.latitude,
                lng = coordinates.longitude,
            )
        }
        TaskInput::FarmOverview { image: img } => {
            image = Some(img.clone());
            FARM_OVERVIEW_PROMPT.to_string()
        }
        TaskInput::DiseaseDetection { image: img } => {
            image = Some(img.clone());
            DISEASE_DETECTION_PROMPT.to_string()
        }
        TaskInput::PestForecast { crop_type, weather } => format!(
            "Given the crop type \"{crop_type}\" and weather conditions \"{weather}\", identify potential pest risks and preventive measures."
        ),
        TaskInput::PestVisual { image: img } => {
            image = Some(img.clone());
            PEST_VISUAL_PROMPT.to_string()
        }
        TaskInput::GrowthGuide { crop } => format!(
            "Provide a detailed step-by-step growth guide for the crop: \"{crop}\". Include stages from seed preparation to harvest."
        ),
        TaskInput::MarketAdvice { price_history } => {
            tier = ModelTier::Reasoning;
            format!(
                "Analyze this price history of crops (prices in Indian Rupees ₹): {price_history}. Advise the farmer whether to \"Sell Now\" or \"Wait\" for better prices based on 2025 market trends and economic factors. Ensure the reasoning is localized and helpful."
            )
        }
    };

    PromptRequest {
        kind,
        instruction,
        schema: schema_for(kind),
        image,
        grounding,
        tier,
    }
}
