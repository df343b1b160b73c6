//! End-to-end screen flows: controller → prompt → fake gateway → state.
//!
//! Gated replies hold a call open so the tests can observe Pending and
//! reorder completions.

use std::sync::Arc;

use agropulse_lib::capture::{Coordinates, DeniedLocation, FixedLocation};
use agropulse_lib::error::ErrorKind;
use agropulse_lib::llm::transport_fake::{FakeTransport, Reply};
use agropulse_lib::llm::types::Severity;
use agropulse_lib::llm::AiGateway;
use agropulse_lib::views::crop_advisor::LOCATION_DENIED;
use agropulse_lib::views::pest_alerts::{ForecastView, NO_RISKS};
use agropulse_lib::views::{
    Badge, CropAdvisor, HealthScanner, MarketTrends, PestAlerts, Phase, Settlement, Shell, View,
};

fn leaf_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([60, 140, 50]));
    let mut jpeg = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut jpeg, image::ImageFormat::Jpeg)
        .unwrap();
    jpeg.into_inner()
}

fn gateway_for(transport: &Arc<FakeTransport>) -> Arc<AiGateway> {
    Arc::new(AiGateway::new(transport.clone()))
}

#[tokio::test]
async fn manual_recommendation_goes_pending_then_succeeds() {
    let (gate, reply) = FakeTransport::gate();
    let transport = Arc::new(FakeTransport::scripted(vec![reply]));
    let advisor = CropAdvisor::new(gateway_for(&transport));
    assert_eq!(advisor.manual_phase(), Phase::Idle);

    let advisor = &advisor;
    let (settled, _) = tokio::join!(advisor.recommend(), async move {
        tokio::task::yield_now().await;
        assert!(matches!(advisor.manual_phase(), Phase::Pending));
        assert!(!advisor.can_trigger());
        let payload = r#"[
            {"crop": "Maize", "reason": "Deep loam", "expectedYield": "6 t/ha"},
            {"crop": "Soybean", "reason": "Fixes nitrogen", "expectedYield": "2.5 t/ha"},
            {"crop": "Groundnut", "reason": "Loose soil", "expectedYield": "2 t/ha"}
        ]"#;
        gate.send(Ok(payload.to_string())).unwrap();
    });

    assert_eq!(settled, Settlement::Applied);
    let Phase::Succeeded(recs) = advisor.manual_phase() else {
        panic!("expected Succeeded");
    };
    assert_eq!(recs.len(), 3);
    assert_eq!(advisor.shown().recommendations.len(), 3);
    assert!(advisor.can_trigger());
    assert!(transport.requests()[0].instruction.contains("Loamy"));
}

#[tokio::test]
async fn diseased_leaf_maps_to_critical_badge() {
    let transport = Arc::new(FakeTransport::new(
        r#"{"status":"diseased","diagnosis":"Leaf Blight","severity":"high","treatment":["Apply fungicide"]}"#,
    ));
    let scanner = HealthScanner::new(gateway_for(&transport));
    scanner.select_image(leaf_jpeg()).unwrap();

    assert_eq!(scanner.scan().await, Settlement::Applied);
    let view = scanner.diagnosis().unwrap();
    assert_eq!(view.analysis.severity, Severity::High);
    assert_eq!(view.analysis.diagnosis, "Leaf Blight");
    assert_eq!(view.badge, Badge::Critical);
    assert!(transport.requests()[0].image.is_some());
}

#[tokio::test]
async fn empty_forecast_is_the_empty_state_not_an_error() {
    let transport = Arc::new(FakeTransport::new("[]"));
    let alerts = PestAlerts::new(gateway_for(&transport));
    alerts.set_crop_type("Corn/Maize");
    alerts.set_weather("Humid, 28°C");

    assert_eq!(alerts.check_risks().await, Settlement::Applied);
    assert!(alerts.forecast_failure().is_none());
    assert_eq!(
        alerts.forecast_view(),
        Some(ForecastView::Empty { message: NO_RISKS })
    );
    assert!(transport.requests()[0]
        .instruction
        .contains("\"Corn/Maize\" and weather conditions \"Humid, 28°C\""));
}

#[tokio::test]
async fn rapid_market_requests_render_only_the_second() {
    let (gate, first) = FakeTransport::gate();
    let transport = Arc::new(FakeTransport::scripted(vec![
        first,
        Reply::Ready(Ok(r#"{"advice":"Wait","reasoning":"Second look"}"#.to_string())),
    ]));
    let trends = MarketTrends::new(gateway_for(&transport));

    let trends = &trends;
    let (first_settled, second_settled) = tokio::join!(trends.analyze(), async move {
        let settled = trends.analyze().await;
        // The first reply only lands after the second has succeeded.
        gate.send(Ok(r#"{"advice":"Sell Now","reasoning":"First look"}"#.to_string())).unwrap();
        settled
    });

    assert_eq!(first_settled, Settlement::Stale);
    assert_eq!(second_settled, Settlement::Applied);
    let advice = trends.advice().unwrap();
    assert_eq!(advice.advice, "Wait");
    assert_eq!(advice.reasoning, "Second look");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn switching_guides_keeps_only_the_latest_crop() {
    let (gate, wheat) = FakeTransport::gate();
    let rice = r#"[{"stage":"Nursery","duration":"3 weeks","instructions":["Soak seed"],"tips":"Keep flooded"}]"#;
    let transport = Arc::new(FakeTransport::scripted(vec![
        wheat,
        Reply::Ready(Ok(rice.to_string())),
    ]));
    let advisor = CropAdvisor::new(gateway_for(&transport));

    let advisor = &advisor;
    let (wheat_settled, rice_settled) = tokio::join!(advisor.open_guide("Wheat"), async move {
        let settled = advisor.open_guide("Rice").await;
        // Wheat's guide arrives after Rice's is already on screen.
        let late = r#"[{"stage":"Sowing","duration":"1 week","instructions":["Drill seed"],"tips":"Check moisture"}]"#;
        gate.send(Ok(late.to_string())).unwrap();
        settled
    });

    assert_eq!(wheat_settled, Settlement::Stale);
    assert_eq!(rice_settled, Settlement::Applied);
    let guide = advisor.active_guide().unwrap();
    assert_eq!(guide.crop, "Rice");
    assert_eq!(guide.steps.len(), 1);
    assert_eq!(guide.steps[0].stage, "Nursery");
    assert!(advisor.guide_loading().is_none());
    assert!(advisor.guide_failure().is_none());
}

#[tokio::test]
async fn denied_geolocation_fails_auto_detect_only() {
    let transport = Arc::new(FakeTransport::new("[]"));
    let advisor = CropAdvisor::new(gateway_for(&transport));
    advisor.set_region("Vidarbha");
    advisor.set_climate("Hot & Dry");

    assert_eq!(advisor.auto_detect(&DeniedLocation).await, Settlement::Applied);

    let Phase::Failed(failure) = advisor.auto_phase() else {
        panic!("expected Failed");
    };
    assert_eq!(failure.error.kind(), ErrorKind::InputUnavailable);
    assert_eq!(failure.message, LOCATION_DENIED);
    // No call went out and the manual side is untouched
    assert_eq!(transport.call_count(), 0);
    assert_eq!(advisor.manual_phase(), Phase::Idle);
    assert_eq!(advisor.form().region, "Vidarbha");
    assert!(advisor.can_trigger());

    // Still editable and usable afterwards
    advisor.set_region("Nagpur");
    assert_eq!(advisor.recommend().await, Settlement::Applied);
    assert!(transport.requests()[0].instruction.contains("region: Nagpur"));
}

#[tokio::test]
async fn manual_reply_cannot_end_pending_auto_detect() {
    let (gate, auto_reply) = FakeTransport::gate();
    let transport = Arc::new(FakeTransport::scripted(vec![
        auto_reply,
        Reply::Ready(Ok("[]".to_string())),
    ]));
    let advisor = CropAdvisor::new(gateway_for(&transport));
    let here = FixedLocation(Coordinates {
        latitude: 21.14,
        longitude: 79.08,
    });

    let advisor = &advisor;
    let (auto_settled, _) = tokio::join!(advisor.auto_detect(&here), async move {
        assert_eq!(advisor.recommend().await, Settlement::Applied);
        assert!(matches!(advisor.auto_phase(), Phase::Pending));
        gate.send(Ok(
            r#"{"locationName":"Nagpur","climateDesc":"Hot","recommendations":[]}"#.to_string(),
        ))
        .unwrap();
    });

    assert_eq!(auto_settled, Settlement::Applied);
    assert_eq!(advisor.shown().detected.unwrap().name, "Nagpur");
}

#[tokio::test]
async fn navigating_away_discards_in_flight_reply() {
    let (gate, reply) = FakeTransport::gate();
    let transport = Arc::new(FakeTransport::scripted(vec![reply]));
    let shell = Shell::new(gateway_for(&transport));
    shell.navigate(View::MarketTrends);

    let shell = &shell;
    let (settled, _) = tokio::join!(shell.market_trends.analyze(), async move {
        tokio::task::yield_now().await;
        shell.navigate_to_id("pest-alert");
        gate.send(Ok(r#"{"advice":"Sell Now","reasoning":"Late"}"#.to_string()))
            .unwrap();
    });

    assert_eq!(settled, Settlement::Stale);
    assert_eq!(shell.current(), View::PestAlerts);
    assert_eq!(shell.market_trends.phase(), Phase::Idle);
}
