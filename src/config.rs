//! Runtime configuration with the site's defaults baked in.
//!
//! Every field has a default, so an empty (or absent) config file yields the
//! behavior the page shipped with: 10 s rotation for sliders, 3 s for the
//! reviews gallery, one muted autoplay retry after 300 ms.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::form::FormRules;

const DEFAULT_SLIDER_INTERVAL_MS: u64 = 10_000;
const DEFAULT_REVIEW_INTERVAL_MS: u64 = 3_000;
const DEFAULT_AUTOPLAY_RETRY_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rotation period for ordinary galleries and the background slider.
    pub slider_interval_ms: u64,
    /// Faster rotation period for the reviews gallery.
    pub review_interval_ms: u64,
    /// Delay before the single muted autoplay retry.
    pub autoplay_retry_delay_ms: u64,
    pub catalog: CatalogSource,
    pub form: FormRules,
    /// Gallery layout. When empty, the application synthesizes the default
    /// page layout over the loaded catalog.
    pub galleries: Vec<GalleryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slider_interval_ms: DEFAULT_SLIDER_INTERVAL_MS,
            review_interval_ms: DEFAULT_REVIEW_INTERVAL_MS,
            autoplay_retry_delay_ms: DEFAULT_AUTOPLAY_RETRY_DELAY_MS,
            catalog: CatalogSource::default(),
            form: FormRules::default(),
            galleries: Vec::new(),
        }
    }
}

impl Config {
    /// Reads a TOML config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    pub fn slider_interval(&self) -> Duration {
        Duration::from_millis(self.slider_interval_ms)
    }

    pub fn review_interval(&self) -> Duration {
        Duration::from_millis(self.review_interval_ms)
    }

    pub fn autoplay_retry_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_retry_delay_ms)
    }
}

/// Where the media catalog comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CatalogSource {
    /// Scan a local directory for media files.
    Directory { path: PathBuf },
    /// Fetch the gallery listing from the site backend.
    Remote { base_url: String },
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::Directory {
            path: PathBuf::from("images"),
        }
    }
}

/// One gallery section of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GalleryConfig {
    pub id: String,
    /// Catalog indices shown by this gallery, in display order.
    pub items: Vec<usize>,
    /// Override of the default slider interval.
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Re-roll a mood tag on every transition (the reviews gallery).
    #[serde(default)]
    pub mood_overlay: bool,
}
