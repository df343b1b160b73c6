//! Provider credentials and model tiers.
//!
//! The API key is resolved from the environment first, then from the OS
//! keychain. Only the Gemini transport ever reads it.

use serde::{Deserialize, Serialize};

pub const KEYRING_SERVICE: &str = "agropulse";
pub const KEYRING_USER: &str = "gemini";

/// Env vars checked for the credential, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Which class of model a task runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Cheap, low-latency model for extraction and vision tasks.
    Fast,
    /// Stronger model for market reasoning.
    Reasoning,
}

/// Find the Gemini API key (env var or keychain).
///
/// If found in the keychain but not in env, loads it into env so later
/// lookups are cheap.
pub fn resolve_api_key() -> Option<String> {
    for var in API_KEY_VARS {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(key) = entry.get_password() {
            if !key.is_empty() {
                std::env::set_var(API_KEY_VARS[0], &key);
                log::info!("[CONFIG] Loaded Gemini key from OS keychain");
                return Some(key);
            }
        }
    }

    None
}

/// Save an API key to the OS keychain and the current process env.
pub fn save_api_key(api_key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(api_key)
        .map_err(|e| format!("Failed to save key: {}", e))?;

    std::env::set_var(API_KEY_VARS[0], api_key);
    log::info!("[CONFIG] Gemini API key saved");
    Ok(())
}
