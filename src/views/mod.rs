//! View Controllers: one per dashboard screen, plus the navigation shell.
//!
//! Each controller owns its `Slot`s (one per independent action), calls the
//! AI Gateway and projects results into render-ready view models. Every
//! error is caught here and recorded as a Failed state; nothing propagates
//! to the shell.
//!
//! Controller methods take `&self` so a screen can keep serving reads (and
//! new triggers) while an earlier call is still in flight.

pub mod crop_advisor;
pub mod health_scanner;
pub mod market_trends;
pub mod overview;
pub mod pest_alerts;
pub mod shell;
pub mod state;

pub use crop_advisor::CropAdvisor;
pub use health_scanner::HealthScanner;
pub use market_trends::MarketTrends;
pub use overview::Overview;
pub use pest_alerts::PestAlerts;
pub use shell::{Shell, View};
pub use state::{Failure, Phase, RequestState, Settlement, Slot, Ticket};

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::GatewayError;
use crate::llm::types::{RiskLevel, Severity};

/// Visual category for severity / risk chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Critical,
    Elevated,
    Caution,
    Calm,
}

impl From<Severity> for Badge {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::High => Badge::Critical,
            Severity::Medium => Badge::Caution,
            Severity::Low => Badge::Calm,
        }
    }
}

impl From<RiskLevel> for Badge {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Severe => Badge::Critical,
            RiskLevel::High => Badge::Elevated,
            RiskLevel::Moderate => Badge::Caution,
            RiskLevel::Low => Badge::Calm,
        }
    }
}

/// Record a gateway outcome with the default alert text.
pub(crate) fn settle_call<T: Clone>(
    slot: &Slot<T>,
    ticket: Ticket,
    result: Result<T, GatewayError>,
) -> Settlement {
    slot.settle(ticket, result.map_err(|e| Failure::new(e.into())))
}

/// Poison-tolerant lock for controller-local form state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_maps_to_badges() {
        assert_eq!(Badge::from(Severity::High), Badge::Critical);
        assert_eq!(Badge::from(Severity::Medium), Badge::Caution);
        assert_eq!(Badge::from(Severity::Low), Badge::Calm);
    }

    #[test]
    fn risk_maps_to_badges() {
        assert_eq!(Badge::from(RiskLevel::Severe), Badge::Critical);
        assert_eq!(Badge::from(RiskLevel::High), Badge::Elevated);
        assert_eq!(Badge::from(RiskLevel::Moderate), Badge::Caution);
        assert_eq!(Badge::from(RiskLevel::Low), Badge::Calm);
    }
}
