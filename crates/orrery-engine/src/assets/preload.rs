// assets/preload.rs
//
// Fan-out/fan-in texture preloader. Fetches are started by the host through
// `TextureSource`; completions come back later through `settle`, in any order.
// Every request settles exactly once (success or failure), so the join always
// completes, after which a short settle delay precedes the ready signal.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::assets::cache::{TextureCache, TextureHandle};
use crate::assets::catalog::{AssetRequest, Catalog};
use crate::core::time::Countdown;

/// Starts texture fetches on behalf of the preloader.
/// The result of each fetch must be reported back through [`AssetPreloader::settle`].
pub trait TextureSource {
    fn fetch(&mut self, url: &str);
}

/// Progress snapshot shown on the loading screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadStatus {
    pub loaded: usize,
    pub total: usize,
    pub message: String,
}

/// Why a single texture did not load. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The host reported a failure (network, decode, ...).
    Failed(String),
    /// The preload watchdog gave up waiting.
    TimedOut,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "{reason}"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPhase {
    Idle,
    Loading,
    /// All requests settled; waiting out the settle delay.
    Settling,
    Ready,
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadEvent {
    Status(PreloadStatus),
    Ready,
}

/// Substring → human-readable label table for status messages.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    rules: Vec<(String, String)>,
    initial_message: String,
    ready_message: String,
}

impl LabelTable {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            initial_message: "Preparing...".to_string(),
            ready_message: "Initializing...".to_string(),
        }
    }

    /// One rule per body texture ("Loading Earth texture...") plus the background.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut table = Self::new();
        let background = AssetRequest::new(catalog.background.as_str());
        table = table.with_rule(background.kind, "Loading star background...");
        for body in &catalog.bodies {
            let request = AssetRequest::new(body.texture.as_str());
            table = table.with_rule(request.kind, format!("Loading {} texture...", body.name));
        }
        table
    }

    pub fn with_rule(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.rules.push((pattern.into(), label.into()));
        self
    }

    pub fn with_initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = message.into();
        self
    }

    pub fn with_ready_message(mut self, message: impl Into<String>) -> Self {
        self.ready_message = message.into();
        self
    }

    /// Label for a request about to be fetched. First matching rule wins.
    pub fn label_for(&self, url: &str, loaded: usize, total: usize) -> String {
        self.rules
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| format!("Loading texture {} of {}...", loaded + 1, total))
    }

    pub fn initial_message(&self) -> &str {
        &self.initial_message
    }

    pub fn ready_message(&self) -> &str {
        &self.ready_message
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AssetPreloader {
    labels: LabelTable,
    status: PreloadStatus,
    phase: PreloadPhase,
    /// URLs started but not yet settled.
    pending: Vec<String>,
    settle_delay: f64,
    watchdog_delay: Option<f64>,
    settle_timer: Countdown,
    watchdog: Countdown,
    events: Vec<PreloadEvent>,
    /// Cleared on teardown; every mutation checks it first.
    alive: bool,
}

impl AssetPreloader {
    pub fn new(labels: LabelTable, settle_delay: f64, watchdog_delay: Option<f64>) -> Self {
        let status = PreloadStatus {
            loaded: 0,
            total: 0,
            message: labels.initial_message().to_string(),
        };
        Self {
            labels,
            status,
            phase: PreloadPhase::Idle,
            pending: Vec::new(),
            settle_delay,
            watchdog_delay,
            settle_timer: Countdown::new(),
            watchdog: Countdown::new(),
            events: Vec::new(),
            alive: true,
        }
    }

    /// Start every fetch. URLs already present in `cache` settle without a fetch.
    /// Only one start per preloader is supported; later calls are ignored.
    pub fn start(
        &mut self,
        requests: &[AssetRequest],
        cache: &mut TextureCache,
        source: &mut dyn TextureSource,
        now: f64,
    ) {
        if !self.alive || self.phase != PreloadPhase::Idle {
            log::warn!("preload already started; ignoring second start");
            return;
        }
        let mut seen = HashSet::new();
        let urls: Vec<&str> = requests
            .iter()
            .map(|r| r.url.as_str())
            .filter(|url| seen.insert(*url))
            .collect();

        self.phase = PreloadPhase::Loading;
        self.status.total = urls.len();

        let mut cached = Vec::new();
        for url in urls {
            self.set_message(self.labels.label_for(url, self.status.loaded, self.status.total));
            self.pending.push(url.to_string());
            if let Some(handle) = cache.get(url) {
                cached.push((url.to_string(), handle));
            } else {
                source.fetch(url);
            }
        }

        if let Some(delay) = self.watchdog_delay {
            self.watchdog.arm(now, delay);
        }

        if self.status.total == 0 {
            self.finish_join(now);
            return;
        }
        for (url, handle) in cached {
            self.settle(&url, Ok(handle), cache, now);
        }
    }

    /// Report the outcome of one fetch. Failures count as settled.
    /// Returns false if the callback was ignored (torn down, unknown URL, or already settled).
    pub fn settle(
        &mut self,
        url: &str,
        outcome: Result<TextureHandle, LoadError>,
        cache: &mut TextureCache,
        now: f64,
    ) -> bool {
        if !self.alive {
            return false;
        }
        let Some(idx) = self.pending.iter().position(|p| p == url) else {
            log::debug!("ignoring settle for {url}: not pending");
            return false;
        };
        self.pending.remove(idx);

        match outcome {
            Ok(handle) => {
                cache.insert(url, handle);
            }
            Err(err) => log::warn!("Failed to load {url}: {err}"),
        }

        self.status.loaded += 1;
        if self.status.loaded < self.status.total {
            self.set_message(format!(
                "Loading textures... ({}/{})",
                self.status.loaded, self.status.total
            ));
        } else {
            self.finish_join(now);
        }
        true
    }

    /// Fire due timers: the watchdog (if configured) and the settle delay.
    pub fn poll(&mut self, cache: &mut TextureCache, now: f64) {
        if !self.alive {
            return;
        }
        if self.watchdog.poll(now) {
            let stalled = self.pending.clone();
            log::warn!("preload watchdog expired with {} texture(s) pending", stalled.len());
            for url in stalled {
                self.settle(&url, Err(LoadError::TimedOut), cache, now);
            }
        }
        if self.settle_timer.poll(now) {
            self.phase = PreloadPhase::Ready;
            self.events.push(PreloadEvent::Ready);
            log::info!("preload ready: {}/{} textures", self.status.loaded, self.status.total);
        }
    }

    /// Stop reacting to anything. In-flight callbacks become no-ops and timers are cancelled.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.phase = PreloadPhase::TornDown;
        self.pending.clear();
        self.settle_timer.cancel();
        self.watchdog.cancel();
        self.events.clear();
    }

    pub fn drain_events(&mut self) -> Vec<PreloadEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn status(&self) -> &PreloadStatus {
        &self.status
    }

    pub fn phase(&self) -> PreloadPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == PreloadPhase::Ready
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    fn finish_join(&mut self, now: f64) {
        self.watchdog.cancel();
        self.phase = PreloadPhase::Settling;
        self.set_message(self.labels.ready_message().to_string());
        self.settle_timer.arm(now, self.settle_delay);
    }

    fn set_message(&mut self, message: String) {
        self.status.message = message;
        self.events.push(PreloadEvent::Status(self.status.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSource {
        fetched: Vec<String>,
    }

    impl TextureSource for RecordingSource {
        fn fetch(&mut self, url: &str) {
            self.fetched.push(url.to_string());
        }
    }

    fn requests(urls: &[&str]) -> Vec<AssetRequest> {
        urls.iter().map(|u| AssetRequest::new(*u)).collect()
    }

    fn ready_count(events: &[PreloadEvent]) -> usize {
        events.iter().filter(|e| **e == PreloadEvent::Ready).count()
    }

    /// Deterministic shuffle (xorshift) so arrival order varies per seed.
    fn shuffled(mut items: Vec<String>, mut seed: u32) -> Vec<String> {
        for i in (1..items.len()).rev() {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            items.swap(i, seed as usize % (i + 1));
        }
        items
    }

    #[test]
    fn settles_after_every_request_regardless_of_order_and_failures() {
        let urls = ["/t/a.jpg", "/t/b.jpg", "/t/a.jpg", "/t/c.jpg", "/t/bg.jpg", "/t/c.jpg"];
        for seed in 1..40u32 {
            let mut cache = TextureCache::new();
            let mut source = RecordingSource::default();
            let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
            pre.start(&requests(&urls), &mut cache, &mut source, 0.0);
            assert_eq!(source.fetched.len(), 4);
            assert_eq!(pre.status().total, 4);

            let order = shuffled(source.fetched.clone(), seed);
            let mut events = Vec::new();
            for (i, url) in order.iter().enumerate() {
                assert_ne!(pre.phase(), PreloadPhase::Settling);
                let outcome = if (i as u32 + seed) % 3 == 0 {
                    Err(LoadError::Failed("404".into()))
                } else {
                    Ok(TextureHandle(i as u32))
                };
                assert!(pre.settle(url, outcome, &mut cache, 0.1));
                pre.poll(&mut cache, 0.1);
                events.extend(pre.drain_events());
            }
            assert_eq!(pre.status().loaded, 4);
            assert_eq!(pre.phase(), PreloadPhase::Settling);
            assert_eq!(ready_count(&events), 0);

            pre.poll(&mut cache, 0.5);
            let events = pre.drain_events();
            assert_eq!(ready_count(&events), 1);
            assert!(pre.is_ready());

            pre.poll(&mut cache, 5.0);
            assert_eq!(ready_count(&pre.drain_events()), 0);
        }
    }

    #[test]
    fn duplicate_and_unknown_callbacks_are_not_counted() {
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
        pre.start(&requests(&["/t/a.jpg", "/t/b.jpg"]), &mut cache, &mut source, 0.0);

        assert!(pre.settle("/t/a.jpg", Ok(TextureHandle(1)), &mut cache, 0.0));
        assert!(!pre.settle("/t/a.jpg", Ok(TextureHandle(1)), &mut cache, 0.0));
        assert!(!pre.settle("/t/zzz.jpg", Ok(TextureHandle(9)), &mut cache, 0.0));
        assert_eq!(pre.status().loaded, 1);
    }

    #[test]
    fn messages_follow_progress() {
        let labels = LabelTable::new()
            .with_rule("8k_sun", "Loading Sun texture...")
            .with_ready_message("Initializing solar system...");
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(labels, 0.3, None);
        pre.start(
            &requests(&["/t/8k_sun.jpg", "/t/mystery.jpg"]),
            &mut cache,
            &mut source,
            0.0,
        );

        let messages: Vec<String> = pre
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                PreloadEvent::Status(s) => Some(s.message),
                PreloadEvent::Ready => None,
            })
            .collect();
        assert_eq!(messages, vec!["Loading Sun texture...", "Loading texture 1 of 2..."]);

        pre.settle("/t/mystery.jpg", Ok(TextureHandle(2)), &mut cache, 0.0);
        assert_eq!(pre.status().message, "Loading textures... (1/2)");
        pre.settle("/t/8k_sun.jpg", Err(LoadError::Failed("decode".into())), &mut cache, 0.0);
        assert_eq!(pre.status().message, "Initializing solar system...");
        assert!(cache.contains("/t/mystery.jpg"));
        assert!(!cache.contains("/t/8k_sun.jpg"));
    }

    #[test]
    fn cached_urls_settle_without_fetching() {
        let mut cache = TextureCache::new();
        cache.insert("/t/a.jpg", TextureHandle(7));
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
        pre.start(&requests(&["/t/a.jpg", "/t/b.jpg"]), &mut cache, &mut source, 0.0);
        assert_eq!(source.fetched, vec!["/t/b.jpg".to_string()]);
        assert_eq!(pre.status().loaded, 1);
    }

    #[test]
    fn cold_start_twice_gives_same_result() {
        let urls = ["/t/a.jpg", "/t/a.jpg", "/t/b.jpg"];
        let mut finals = Vec::new();
        for _ in 0..2 {
            let mut cache = TextureCache::new();
            let mut source = RecordingSource::default();
            let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
            pre.start(&requests(&urls), &mut cache, &mut source, 0.0);
            for url in source.fetched.clone() {
                pre.settle(&url, Ok(TextureHandle(0)), &mut cache, 0.0);
            }
            pre.poll(&mut cache, 0.3);
            assert!(pre.is_ready());
            finals.push(pre.status().clone());
        }
        assert_eq!(finals[0], finals[1]);
        assert_eq!(finals[0].total, 2);
        assert_eq!(finals[0].loaded, 2);
    }

    #[test]
    fn empty_request_set_goes_straight_to_settling() {
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
        pre.start(&[], &mut cache, &mut source, 0.0);
        assert_eq!(pre.phase(), PreloadPhase::Settling);
        pre.poll(&mut cache, 0.3);
        assert!(pre.is_ready());
    }

    #[test]
    fn teardown_ignores_late_callbacks_and_timers() {
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
        pre.start(&requests(&["/t/a.jpg"]), &mut cache, &mut source, 0.0);
        pre.drain_events();
        pre.teardown();

        assert!(!pre.settle("/t/a.jpg", Ok(TextureHandle(1)), &mut cache, 0.1));
        pre.poll(&mut cache, 10.0);
        assert!(pre.drain_events().is_empty());
        assert_eq!(pre.status().loaded, 0);
        assert!(cache.is_empty());
        assert_eq!(pre.phase(), PreloadPhase::TornDown);
    }

    #[test]
    fn watchdog_settles_stalled_requests_as_failed() {
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, Some(5.0));
        pre.start(&requests(&["/t/a.jpg", "/t/b.jpg"]), &mut cache, &mut source, 0.0);
        pre.settle("/t/a.jpg", Ok(TextureHandle(1)), &mut cache, 1.0);

        pre.poll(&mut cache, 4.0);
        assert_eq!(pre.phase(), PreloadPhase::Loading);
        pre.poll(&mut cache, 5.0);
        assert_eq!(pre.status().loaded, 2);
        assert_eq!(pre.phase(), PreloadPhase::Settling);
        pre.poll(&mut cache, 5.5);
        assert!(pre.is_ready());
    }

    #[test]
    fn second_start_is_ignored() {
        let mut cache = TextureCache::new();
        let mut source = RecordingSource::default();
        let mut pre = AssetPreloader::new(LabelTable::new(), 0.3, None);
        pre.start(&requests(&["/t/a.jpg"]), &mut cache, &mut source, 0.0);
        pre.start(&requests(&["/t/a.jpg", "/t/b.jpg"]), &mut cache, &mut source, 0.0);
        assert_eq!(source.fetched.len(), 1);
        assert_eq!(pre.status().total, 1);
    }
}
