//! Schema Registry: the expected shape of every AI response.
//!
//! One `ResponseSchema` per `TaskKind`, built once and shared as a
//! `&'static` reference. The same schema is sent to the model as its
//! `responseSchema` and used to validate what comes back.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::OnceLock;

pub const RISK_LEVELS: &[&str] = &["Low", "Moderate", "High", "Severe"];
pub const SEVERITIES: &[&str] = &["low", "medium", "high"];
pub const HEALTH_STATUSES: &[&str] = &["healthy", "diseased", "unknown"];

/// The closed set of AI-backed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    CropRecommendation,
    AutoLocationRecommendation,
    FarmOverview,
    DiseaseDetection,
    PestForecast,
    PestVisual,
    GrowthGuide,
    MarketAdvice,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::CropRecommendation,
        TaskKind::AutoLocationRecommendation,
        TaskKind::FarmOverview,
        TaskKind::DiseaseDetection,
        TaskKind::PestForecast,
        TaskKind::PestVisual,
        TaskKind::GrowthGuide,
        TaskKind::MarketAdvice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CropRecommendation => "crop-recommendation",
            TaskKind::AutoLocationRecommendation => "auto-location-recommendation",
            TaskKind::FarmOverview => "farm-overview",
            TaskKind::DiseaseDetection => "disease-detection",
            TaskKind::PestForecast => "pest-forecast",
            TaskKind::PestVisual => "pest-visual",
            TaskKind::GrowthGuide => "growth-guide",
            TaskKind::MarketAdvice => "market-advice",
        }
    }

    /// Tasks that must carry exactly one image.
    pub fn requires_image(&self) -> bool {
        matches!(
            self,
            TaskKind::FarmOverview | TaskKind::DiseaseDetection | TaskKind::PestVisual
        )
    }

    fn index(&self) -> usize {
        match self {
            TaskKind::CropRecommendation => 0,
            TaskKind::AutoLocationRecommendation => 1,
            TaskKind::FarmOverview => 2,
            TaskKind::DiseaseDetection => 3,
            TaskKind::PestForecast => 4,
            TaskKind::PestVisual => 5,
            TaskKind::GrowthGuide => 6,
            TaskKind::MarketAdvice => 7,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A string, optionally restricted to a closed value set.
    String { allowed: Option<&'static [&'static str]> },
    Number,
    Array(Box<SchemaNode>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub node: SchemaNode,
    pub required: bool,
}

impl SchemaNode {
    fn text() -> Self {
        SchemaNode::String { allowed: None }
    }

    fn one_of(values: &'static [&'static str]) -> Self {
        SchemaNode::String {
            allowed: Some(values),
        }
    }

    fn list_of_text() -> Self {
        SchemaNode::Array(Box::new(SchemaNode::text()))
    }

    /// Object whose fields are all required.
    fn record(fields: Vec<(&'static str, SchemaNode)>) -> Self {
        SchemaNode::Object(
            fields
                .into_iter()
                .map(|(name, node)| Field {
                    name,
                    node,
                    required: true,
                })
                .collect(),
        )
    }

    /// Render in the Gemini `responseSchema` dialect.
    pub fn to_gemini(&self) -> Value {
        match self {
            SchemaNode::String { allowed: None } => json!({ "type": "STRING" }),
            SchemaNode::String {
                allowed: Some(values),
            } => json!({ "type": "STRING", "enum": values }),
            SchemaNode::Number => json!({ "type": "NUMBER" }),
            SchemaNode::Array(items) => json!({ "type": "ARRAY", "items": items.to_gemini() }),
            SchemaNode::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    properties.insert(field.name.to_string(), field.node.to_gemini());
                }
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name)
                    .collect();
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        match self {
            SchemaNode::String { allowed } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| SchemaViolation::new(path, "expected a string"))?;
                if let Some(values) = allowed {
                    if !values.contains(&s) {
                        return Err(SchemaViolation::new(
                            path,
                            &format!("\"{}\" is not one of {:?}", s, values),
                        ));
                    }
                }
                Ok(())
            }
            SchemaNode::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(SchemaViolation::new(path, "expected a number"))
                }
            }
            SchemaNode::Array(items) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| SchemaViolation::new(path, "expected an array"))?;
                for (i, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            SchemaNode::Object(fields) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| SchemaViolation::new(path, "expected an object"))?;
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match object.get(field.name) {
                        Some(v) => field.node.check(v, &field_path)?,
                        None if field.required => {
                            return Err(SchemaViolation::new(
                                &field_path,
                                "missing required field",
                            ))
                        }
                        None => {}
                    }
                }
                Ok(())
            }
        }
    }
}

/// First point at which a payload diverges from its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: &str) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Declared response shape for one task kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub kind: TaskKind,
    pub root: SchemaNode,
}

impl ResponseSchema {
    /// Names of the required fields of the top-level record
    /// (or of the element record, for list-shaped responses).
    pub fn required_fields(&self) -> Vec<&'static str> {
        let record = match &self.root {
            SchemaNode::Array(items) => items.as_ref(),
            other => other,
        };
        match record {
            SchemaNode::Object(fields) => fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_gemini(&self) -> Value {
        self.root.to_gemini()
    }

    /// Check a parsed payload. Unknown extra fields are tolerated.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.root.check(value, "$")
    }
}

fn recommendation_item() -> SchemaNode {
    SchemaNode::record(vec![
        ("crop", SchemaNode::text()),
        ("reason", SchemaNode::text()),
        ("expectedYield", SchemaNode::text()),
    ])
}

fn build(kind: TaskKind) -> ResponseSchema {
    let root = match kind {
        TaskKind::CropRecommendation => SchemaNode::Array(Box::new(recommendation_item())),
        TaskKind::AutoLocationRecommendation => SchemaNode::record(vec![
            ("locationName", SchemaNode::text()),
            ("climateDesc", SchemaNode::text()),
            (
                "recommendations",
                SchemaNode::Array(Box::new(recommendation_item())),
            ),
        ]),
        TaskKind::FarmOverview => SchemaNode::record(vec![
            ("soilQuality", SchemaNode::text()),
            ("pestRisk", SchemaNode::text()),
            ("cropHealth", SchemaNode::text()),
            ("summary", SchemaNode::text()),
        ]),
        TaskKind::DiseaseDetection => SchemaNode::record(vec![
            ("status", SchemaNode::one_of(HEALTH_STATUSES)),
            ("diagnosis", SchemaNode::text()),
            ("severity", SchemaNode::one_of(SEVERITIES)),
            ("treatment", SchemaNode::list_of_text()),
        ]),
        TaskKind::PestForecast => SchemaNode::Array(Box::new(SchemaNode::record(vec![
            ("pest", SchemaNode::text()),
            ("riskLevel", SchemaNode::one_of(RISK_LEVELS)),
            ("preventiveMeasures", SchemaNode::list_of_text()),
        ]))),
        TaskKind::PestVisual => SchemaNode::record(vec![
            ("pestName", SchemaNode::text()),
            ("damageDescription", SchemaNode::text()),
            ("solutions", SchemaNode::list_of_text()),
            ("riskLevel", SchemaNode::one_of(RISK_LEVELS)),
        ]),
        TaskKind::GrowthGuide => SchemaNode::Array(Box::new(SchemaNode::record(vec![
            ("stage", SchemaNode::text()),
            ("duration", SchemaNode::text()),
            ("instructions", SchemaNode::list_of_text()),
            ("tips", SchemaNode::text()),
        ]))),
        TaskKind::MarketAdvice => SchemaNode::record(vec![
            ("advice", SchemaNode::text()),
            ("reasoning", SchemaNode::text()),
        ]),
    };
    ResponseSchema { kind, root }
}

static REGISTRY: OnceLock<Vec<ResponseSchema>> = OnceLock::new();

/// Look up the schema for a task kind. Total over `TaskKind`.
pub fn schema_for(kind: TaskKind) -> &'static ResponseSchema {
    let registry = REGISTRY.get_or_init(|| TaskKind::ALL.iter().map(|k| build(*k)).collect());
    &registry[kind.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_required_fields() {
        for kind in TaskKind::ALL {
            let schema = schema_for(kind);
            assert_eq!(schema.kind, kind);
            assert!(
                !schema.required_fields().is_empty(),
                "{} has no required fields",
                kind
            );
        }
    }

    #[test]
    fn lookup_is_idempotent() {
        for kind in TaskKind::ALL {
            let a = schema_for(kind);
            let b = schema_for(kind);
            assert!(std::ptr::eq(a, b));
            assert_eq!(a, &build(kind));
        }
    }

    #[test]
    fn rejects_enum_value_outside_declared_set() {
        let schema = schema_for(TaskKind::PestForecast);
        let payload = json!([
            { "pest": "Aphids", "riskLevel": "Extreme", "preventiveMeasures": [] }
        ]);
        let err = schema.validate(&payload).unwrap_err();
        assert_eq!(err.path, "$[0].riskLevel");
    }

    #[test]
    fn rejects_missing_nested_field() {
        let schema = schema_for(TaskKind::AutoLocationRecommendation);
        let payload = json!({
            "locationName": "Pune",
            "climateDesc": "Semi-arid",
            "recommendations": [{ "crop": "Jowar", "reason": "Drought tolerant" }]
        });
        let err = schema.validate(&payload).unwrap_err();
        assert_eq!(err.path, "$.recommendations[0].expectedYield");
        assert_eq!(err.reason, "missing required field");
    }

    #[test]
    fn rejects_scalar_where_list_expected() {
        let schema = schema_for(TaskKind::DiseaseDetection);
        let payload = json!({
            "status": "diseased",
            "diagnosis": "Rust",
            "severity": "low",
            "treatment": "Spray sulfur"
        });
        assert!(schema.validate(&payload).is_err());
    }

    #[test]
    fn accepts_conformant_payload_with_extra_fields() {
        let schema = schema_for(TaskKind::MarketAdvice);
        let payload = json!({ "advice": "Wait", "reasoning": "Prices rising", "confidence": 0.7 });
        assert!(schema.validate(&payload).is_ok());
    }

    #[test]
    fn gemini_rendering_carries_enums_and_required() {
        let rendered = schema_for(TaskKind::PestVisual).to_gemini();
        assert_eq!(rendered["type"], "OBJECT");
        assert_eq!(rendered["properties"]["solutions"]["type"], "ARRAY");
        assert_eq!(rendered["properties"]["riskLevel"]["enum"][3], "Severe");
        let required = rendered["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
    }
}
