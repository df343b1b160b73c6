//! Live tests against the real Gemini API.
//!
//! Loads the API key from .env.local using dotenvy, same as the app.
//! Every test skips when no GEMINI_API_KEY is present.

use std::sync::Arc;

use agropulse_lib::config::Settings;
use agropulse_lib::llm::types::{MarketAdvice, Recommendation};
use agropulse_lib::llm::{build_prompt, AiGateway, GeminiTransport, TaskInput};
use agropulse_lib::market;

fn load_env() -> bool {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let env_path = manifest_dir.join(".env.local");
    eprintln!("[TEST] Loading env from: {}", env_path.display());
    if env_path.exists() {
        dotenvy::from_path(&env_path).expect("Failed to load .env.local");
        eprintln!("[TEST] Loaded .env.local");
    } else {
        eprintln!("[TEST] .env.local NOT FOUND at {}", env_path.display());
    }
    let key_present = std::env::var("GEMINI_API_KEY")
        .map(|k| !k.is_empty())
        .unwrap_or(false);
    eprintln!("[TEST] GEMINI_API_KEY present: {}", key_present);
    key_present
}

fn live_gateway() -> AiGateway {
    let transport = GeminiTransport::new(Settings::load()).expect("Failed to build transport");
    AiGateway::new(Arc::new(transport))
}

#[tokio::test]
async fn test_live_crop_recommendation() {
    if !load_env() {
        eprintln!("SKIP: No GEMINI_API_KEY");
        return;
    }

    let prompt = build_prompt(&TaskInput::CropRecommendation {
        soil_type: "Loamy".into(),
        region: "Punjab".into(),
        climate: "Hot summers, mild winters".into(),
    });

    let start = std::time::Instant::now();
    let recs: Vec<Recommendation> = live_gateway()
        .run(&prompt)
        .await
        .expect("Gemini call failed");
    eprintln!("[TEST] Returned in {}ms", start.elapsed().as_millis());
    for r in &recs {
        eprintln!("[TEST]   {} ({})", r.crop, r.expected_yield);
    }

    assert!(!recs.is_empty(), "Expected at least one recommendation");
}

#[tokio::test]
async fn test_live_market_advice() {
    if !load_env() {
        eprintln!("SKIP: No GEMINI_API_KEY");
        return;
    }

    let rice = market::lookup("Rice").expect("Rice is seeded");
    let prompt = build_prompt(&TaskInput::MarketAdvice {
        price_history: rice.history_line(),
    });

    let advice: MarketAdvice = live_gateway()
        .run(&prompt)
        .await
        .expect("Gemini call failed");
    eprintln!("[TEST] Advice: {} ({})", advice.advice, advice.reasoning);

    assert!(!advice.advice.is_empty());
    assert!(!advice.reasoning.is_empty());
}
