//! Which full-screen loader, if any, is on screen.
//!
//! The brand splash plays once per browser session; the flag lives in the
//! session store. Navigating to a themed section shows that section's loader
//! for at least `min_visible` before the screen may mount, and at most
//! `max_visible`. Nothing here blocks or retries data loads.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

/// Session-store key recording that the splash has played.
pub const SPLASH_SHOWN_KEY: &str = "restaurant-brand-splash-shown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Menu,
    Reservation,
    Checkout,
    About,
    Contact,
}

impl LoaderKind {
    /// Loader for a route path; `None` for routes without a themed loader.
    pub fn for_path(path: &str) -> Option<Self> {
        let section = path.trim_start_matches('/').split(['/', '?', '#']).next().unwrap_or("");
        match section {
            "menu" => Some(LoaderKind::Menu),
            "reservation" | "reservations" => Some(LoaderKind::Reservation),
            "checkout" => Some(LoaderKind::Checkout),
            "about" => Some(LoaderKind::About),
            "contact" => Some(LoaderKind::Contact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    BrandSplash { since: Instant },
    RouteLoader { kind: LoaderKind, since: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderTimings {
    pub splash: Duration,
    pub min_visible: Duration,
    pub max_visible: Duration,
}

impl Default for LoaderTimings {
    fn default() -> Self {
        Self {
            splash: Duration::from_millis(2500),
            min_visible: Duration::from_millis(1200),
            max_visible: Duration::from_millis(4000),
        }
    }
}

pub struct RouteLoader {
    state: LoaderState,
    session: Arc<dyn KeyValueStore>,
    timings: LoaderTimings,
}

impl RouteLoader {
    pub fn new(session: Arc<dyn KeyValueStore>, timings: LoaderTimings) -> Self {
        Self {
            state: LoaderState::Idle,
            session,
            timings,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn active_kind(&self) -> Option<LoaderKind> {
        match self.state {
            LoaderState::RouteLoader { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Called when the app boots. Starts the splash unless this session has
    /// already seen it; returns whether it started.
    pub fn begin_session(&mut self, now: Instant) -> bool {
        if self.session.get(SPLASH_SHOWN_KEY).is_some() {
            return false;
        }
        if let Err(e) = self.session.set(SPLASH_SHOWN_KEY, "true".to_string()) {
            // The splash may replay on reload; harmless.
            warn!(error = %e, "Could not record splash flag");
        }
        debug!("Showing brand splash");
        self.state = LoaderState::BrandSplash { since: now };
        true
    }

    /// Navigation signal for `kind`. Ignored while the splash is playing.
    pub fn signal(&mut self, kind: LoaderKind, now: Instant) {
        if matches!(self.state, LoaderState::BrandSplash { .. }) {
            return;
        }
        debug!(?kind, "Showing route loader");
        self.state = LoaderState::RouteLoader { kind, since: now };
    }

    /// Navigation to `path`; shows the matching loader if there is one.
    pub fn navigate(&mut self, path: &str, now: Instant) -> Option<LoaderKind> {
        let kind = LoaderKind::for_path(path)?;
        self.signal(kind, now);
        self.active_kind()
    }

    /// Whether the target screen may mount: the route loader has been up for
    /// `min_visible`, or no route loader is showing.
    pub fn can_mount(&self, now: Instant) -> bool {
        match self.state {
            LoaderState::RouteLoader { since, .. } => now.duration_since(since) >= self.timings.min_visible,
            _ => true,
        }
    }

    /// Time left before [`Self::can_mount`] holds.
    pub fn remaining_hold(&self, now: Instant) -> Duration {
        match self.state {
            LoaderState::RouteLoader { since, .. } => self.timings.min_visible.saturating_sub(now.duration_since(since)),
            _ => Duration::ZERO,
        }
    }

    /// Sleeps until the target screen may mount.
    pub async fn hold(&self) {
        let remaining = self.remaining_hold(Instant::now());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }

    /// The route changed: a route loader is dismissed.
    pub fn route_changed(&mut self) {
        if let LoaderState::RouteLoader { kind, .. } = self.state {
            debug!(?kind, "Route changed; hiding loader");
            self.state = LoaderState::Idle;
        }
    }

    /// Expires the splash after `splash` and a route loader after
    /// `max_visible`.
    pub fn tick(&mut self, now: Instant) {
        let expired = match self.state {
            LoaderState::Idle => false,
            LoaderState::BrandSplash { since } => now.duration_since(since) >= self.timings.splash,
            LoaderState::RouteLoader { since, .. } => now.duration_since(since) >= self.timings.max_visible,
        };
        if expired {
            debug!(state = ?self.state, "Loader timed out");
            self.state = LoaderState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn loader(session: &Arc<MemoryStorage>) -> RouteLoader {
        RouteLoader::new(session.clone(), LoaderTimings::default())
    }

    #[test]
    fn splash_shows_once_per_session() {
        let session = Arc::new(MemoryStorage::new());
        let now = Instant::now();

        let mut first = loader(&session);
        assert!(first.begin_session(now));
        assert!(matches!(first.state(), LoaderState::BrandSplash { .. }));

        let mut reload = loader(&session);
        assert!(!reload.begin_session(now));
        assert_eq!(reload.state(), LoaderState::Idle);
    }

    #[test]
    fn splash_expires_and_ignores_navigation() {
        let session = Arc::new(MemoryStorage::new());
        let start = Instant::now();
        let mut loader = loader(&session);
        loader.begin_session(start);

        assert_eq!(loader.navigate("/menu", start), None);
        loader.tick(start + Duration::from_millis(2499));
        assert!(matches!(loader.state(), LoaderState::BrandSplash { .. }));
        loader.tick(start + Duration::from_millis(2500));
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    #[test]
    fn route_loader_holds_for_min_visible() {
        let session = Arc::new(MemoryStorage::new());
        let start = Instant::now();
        let mut loader = loader(&session);

        assert_eq!(loader.navigate("/checkout?step=2", start), Some(LoaderKind::Checkout));
        assert!(!loader.can_mount(start + Duration::from_millis(1000)));
        assert_eq!(loader.remaining_hold(start + Duration::from_millis(1000)), Duration::from_millis(200));
        assert!(loader.can_mount(start + Duration::from_millis(1200)));

        loader.route_changed();
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    #[test]
    fn route_loader_times_out() {
        let session = Arc::new(MemoryStorage::new());
        let start = Instant::now();
        let mut loader = loader(&session);
        loader.signal(LoaderKind::About, start);

        loader.tick(start + Duration::from_millis(3999));
        assert_eq!(loader.active_kind(), Some(LoaderKind::About));
        loader.tick(start + Duration::from_secs(4));
        assert_eq!(loader.active_kind(), None);
    }

    #[test]
    fn unthemed_paths_show_nothing() {
        assert_eq!(LoaderKind::for_path("/"), None);
        assert_eq!(LoaderKind::for_path("/track-order"), None);
        assert_eq!(LoaderKind::for_path("/reservation/RSV-ABCDE"), Some(LoaderKind::Reservation));
        assert_eq!(LoaderKind::for_path("contact"), Some(LoaderKind::Contact));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_waits_out_the_minimum() {
        let session = Arc::new(MemoryStorage::new());
        let mut loader = loader(&session);
        let start = Instant::now();
        loader.signal(LoaderKind::Menu, start);

        loader.hold().await;

        assert!(Instant::now().duration_since(start) >= Duration::from_millis(1200));
        assert!(loader.can_mount(Instant::now()));
    }
}
