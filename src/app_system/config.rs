use std::str::FromStr;
use std::time::Duration;

use crate::mirror_framework::MirrorSettings;
use crate::route_loader::LoaderTimings;

/// Application settings.
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `RESTAURANT_BUFFER_SIZE` | 32 | Request queue length per mirror |
/// | `RESTAURANT_REFRESH_DEBOUNCE_MS` | 150 | Window that coalesces change events |
/// | `RESTAURANT_ID_ATTEMPTS` | 8 | Id regenerations before giving up |
/// | `RESTAURANT_TAX_RATE` | 0.08 | Tax applied at checkout |
/// | `RESTAURANT_CHECKOUT_DELAY_MS` | 1500 | Simulated payment time |
/// | `RESTAURANT_SPLASH_MS` | 2500 | Brand splash duration |
/// | `RESTAURANT_LOADER_MIN_MS` | 1200 | Minimum route loader time |
/// | `RESTAURANT_LOADER_MAX_MS` | 4000 | Route loader timeout |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub buffer_size: usize,
    pub refresh_debounce: Duration,
    pub id_attempts: usize,
    pub tax_rate: f64,
    pub checkout_delay: Duration,
    pub loader: LoaderTimings,
}

impl Default for Config {
    fn default() -> Self {
        let mirror = MirrorSettings::default();
        Self {
            buffer_size: mirror.buffer_size,
            refresh_debounce: mirror.refresh_debounce,
            id_attempts: mirror.id_attempts,
            tax_rate: 0.08,
            checkout_delay: Duration::from_millis(1500),
            loader: LoaderTimings::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by any `RESTAURANT_*` variables that parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            parsed(&lookup, key).map(Duration::from_millis).unwrap_or(default)
        };
        Self {
            buffer_size: parsed(&lookup, "RESTAURANT_BUFFER_SIZE")
                .filter(|size: &usize| *size > 0)
                .unwrap_or(defaults.buffer_size),
            refresh_debounce: millis("RESTAURANT_REFRESH_DEBOUNCE_MS", defaults.refresh_debounce),
            id_attempts: parsed(&lookup, "RESTAURANT_ID_ATTEMPTS")
                .filter(|attempts: &usize| *attempts > 0)
                .unwrap_or(defaults.id_attempts),
            tax_rate: parsed(&lookup, "RESTAURANT_TAX_RATE")
                .filter(|rate: &f64| rate.is_finite() && *rate >= 0.0)
                .unwrap_or(defaults.tax_rate),
            checkout_delay: millis("RESTAURANT_CHECKOUT_DELAY_MS", defaults.checkout_delay),
            loader: LoaderTimings {
                splash: millis("RESTAURANT_SPLASH_MS", defaults.loader.splash),
                min_visible: millis("RESTAURANT_LOADER_MIN_MS", defaults.loader.min_visible),
                max_visible: millis("RESTAURANT_LOADER_MAX_MS", defaults.loader.max_visible),
            },
        }
    }

    pub fn mirror_settings(&self) -> MirrorSettings {
        MirrorSettings {
            buffer_size: self.buffer_size,
            refresh_debounce: self.refresh_debounce,
            id_attempts: self.id_attempts,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}
