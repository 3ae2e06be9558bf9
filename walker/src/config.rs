use std::path::Path;

use anyhow::Result;
use navigation::{ClassifierConfig, NavigationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Tracing
// ============================================================================

// RUST_LOG wins over the built-in filter
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

// ============================================================================
// Navigation Configuration
// ============================================================================

// Config file if given, otherwise the gallery tuning or the plain defaults
pub fn load_navigation_config(path: Option<&Path>, gallery: bool) -> Result<NavigationConfig> {
    let config = match path {
        Some(path) => {
            info!("loading navigation config from {}", path.display());
            NavigationConfig::load(path)?
        }
        None if gallery => NavigationConfig::gallery(),
        None => NavigationConfig::default(),
    };
    Ok(config)
}

pub fn load_classifier_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    path.map_or_else(|| Ok(ClassifierConfig::default()), ClassifierConfig::load)
}
