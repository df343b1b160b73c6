//! Market Trends screen: price chart per crop plus "Sell Now" / "Wait".

use std::sync::{Arc, Mutex};

use super::state::{Failure, Phase, Settlement, Slot};
use super::{lock, settle_call};
use crate::error::TaskError;
use crate::llm::prompts::{build_prompt, TaskInput};
use crate::llm::types::MarketAdvice;
use crate::llm::AiGateway;
use crate::market::{self, CropMarket};

pub struct MarketTrends {
    gateway: Arc<AiGateway>,
    selected: Mutex<&'static CropMarket>,
    advice: Slot<MarketAdvice>,
}

impl MarketTrends {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            selected: Mutex::new(default_crop()),
            advice: Slot::new(),
        }
    }

    pub fn crops(&self) -> Vec<&'static str> {
        market::crop_names()
    }

    pub fn selected(&self) -> &'static CropMarket {
        *lock(&self.selected)
    }

    /// Switch crops. Advice for the previous crop (pending or shown) is dropped.
    pub fn select_crop(&self, crop: &str) -> Result<(), TaskError> {
        let entry = market::lookup(crop).ok_or_else(|| {
            TaskError::InputUnavailable(format!("no price history for '{}'", crop))
        })?;
        *lock(&self.selected) = entry;
        self.advice.reset();
        Ok(())
    }

    /// Ask for advice on the selected crop's price history.
    pub async fn analyze(&self) -> Settlement {
        let crop = self.selected();
        let ticket = self.advice.begin();
        log::info!("[VIEW] Market advice requested for {}", crop.crop);
        let result = self
            .gateway
            .run::<MarketAdvice>(&build_prompt(&TaskInput::MarketAdvice {
                price_history: crop.history_line(),
            }))
            .await;
        settle_call(&self.advice, ticket, result)
    }

    pub fn phase(&self) -> Phase<MarketAdvice> {
        self.advice.phase()
    }

    pub fn advice(&self) -> Option<MarketAdvice> {
        self.advice.value()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.advice.failure()
    }

    pub fn is_analyzing(&self) -> bool {
        self.advice.is_pending()
    }

    /// Dismiss the advice card.
    pub fn clear(&self) {
        self.advice.reset();
    }

    pub fn reset(&self) {
        self.advice.reset();
        *lock(&self.selected) = default_crop();
    }
}

fn default_crop() -> &'static CropMarket {
    // The default crop is always part of the dataset.
    market::lookup(market::DEFAULT_CROP).unwrap_or(&market::CROPS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::transport_fake::FakeTransport;

    fn trends(transport: Arc<FakeTransport>) -> MarketTrends {
        MarketTrends::new(Arc::new(AiGateway::new(transport)))
    }

    #[test]
    fn starts_on_maize() {
        let view = trends(Arc::new(FakeTransport::new("{}")));
        assert_eq!(view.selected().crop, "Maize");
        assert_eq!(view.crops().len(), 7);
    }

    #[tokio::test]
    async fn analyze_sends_selected_history() {
        let transport = Arc::new(FakeTransport::new(
            r#"{"advice":"Wait","reasoning":"Prices climbing"}"#,
        ));
        let view = trends(transport.clone());
        view.select_crop("Rice").unwrap();
        assert_eq!(view.analyze().await, Settlement::Applied);
        assert_eq!(view.advice().unwrap().advice, "Wait");

        let sent = &transport.requests()[0];
        assert!(sent.instruction.contains("Jan 25: ₹3200"));
        assert!(sent.instruction.contains("Jun 25: ₹3800"));
    }

    #[tokio::test]
    async fn switching_crop_drops_advice() {
        let view = trends(Arc::new(FakeTransport::new(
            r#"{"advice":"Sell Now","reasoning":"Peak"}"#,
        )));
        view.analyze().await;
        assert!(view.advice().is_some());
        view.select_crop("Cotton").unwrap();
        assert!(view.advice().is_none());
    }

    #[test]
    fn unknown_crop_is_rejected() {
        let view = trends(Arc::new(FakeTransport::new("{}")));
        assert!(view.select_crop("Saffron").is_err());
        assert_eq!(view.selected().crop, "Maize");
    }
}
