//! AgroPulse: farm advisory dashboard core.
//!
//! This is the crate root that wires the domains together. No business
//! logic lives here, only module declarations and process start-up.
//!
//! Domains:
//!   - llm: schema registry, prompt builder, AI gateway, transports
//!   - capture: geolocation and image sources
//!   - market: static Mandi price history
//!   - views: per-screen controllers and the navigation shell
//!   - config: settings file + env overrides

pub mod capture;
pub mod config;
pub mod error;
pub mod llm;
pub mod market;
pub mod views;

pub use error::{CaptureError, ErrorKind, GatewayError, TaskError};
pub use views::{Shell, View};

/// Load `.env.local` → `.env` and start the logger.
///
/// Safe to call more than once; later calls only re-read the env file.
pub fn init() {
    // CARGO_MANIFEST_DIR finds the project root regardless of the
    // binary's working directory.
    let project_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));

    'env_load: for env_file in [".env.local", ".env"] {
        let path = project_root.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    if env_logger::try_init().is_ok() {
        log::info!("AgroPulse starting up");
    }
}
