// Rail orchestration. One owned controller per mounted list: refs, timers, and
// the lock deadline live here, never in globals, so several rails can coexist on
// one page and the whole thing unit-tests against a synthetic host.

use std::collections::HashSet;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::debounce::{ActiveIndexDebouncer, CommitOutcome};
use crate::error::RailError;
use crate::geometry::GeometrySampler;
use crate::halo::CursorSmoother;
use crate::host::{MeasuredHost, ViewportHost};
use crate::progress::ProgressMapper;
use crate::types::{
    Card, CardRender, CardSpec, ElementHandle, Point, RailConfig, RenderSnapshot, ScrollBehavior,
    SignalBatch, SignalKind, Timestamp, VisibilitySample,
};
use crate::visibility::VisibilityVoter;

/// Handle id reserved for the tracked region; cards follow at 1..=card_count.
const REGION_HANDLE_ID: u32 = 0;

/// Scroll-synchronized active-card tracker with a smoothed halo cursor.
pub struct RailController {
    cards: Vec<Card>,
    sampler: GeometrySampler,
    voter: VisibilityVoter,
    debouncer: ActiveIndexDebouncer,
    mapper: ProgressMapper,
    smoother: CursorSmoother,
    config: RailConfig,
    /// Latest raw scroll progress; recomputed from live geometry, never integrated.
    progress_t: f32,
    /// Latest Bezier target; the smoother reads it, never writes it.
    target: Point,
    /// Coalescing guard: set by scroll/resize/geometry signals, consumed by the
    /// next frame's re-measurement. Starts set so the first frame measures.
    scroll_dirty: bool,
    reduced_motion: bool,
    mounted: bool,
}

impl RailController {
    /// Register a card sequence. An empty sequence yields an inert controller:
    /// no subscriptions, no commits, no snapshot.
    pub fn new(specs: Vec<CardSpec>, config: RailConfig) -> Self {
        let cards: Vec<Card> = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Card {
                spec,
                handle: ElementHandle::new(REGION_HANDLE_ID + 1 + i as u32),
            })
            .collect();

        let voter = VisibilityVoter::new(cards.len());
        let debouncer = ActiveIndexDebouncer::new(
            config.debounce_us,
            config.manual_lock_us,
            config.min_visibility_ratio,
        );
        let mapper = ProgressMapper::new(config.curve);
        let mounted = !cards.is_empty();

        RailController {
            cards,
            sampler: GeometrySampler::new(ElementHandle::new(REGION_HANDLE_ID)),
            voter,
            debouncer,
            mapper,
            smoother: CursorSmoother::new(),
            config,
            progress_t: 0.0,
            target: Point::default(),
            scroll_dirty: true,
            reduced_motion: false,
            mounted,
        }
    }

    pub fn region_handle(&self) -> ElementHandle {
        self.sampler.region_handle()
    }

    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Tear down. Every scheduled callback entry point checks liveness, so a
    /// frame or batch already in flight against this controller is a no-op.
    pub fn unmount(&mut self) {
        if self.mounted {
            log::debug!("rail unmounted; dropping pending timers and subscriptions");
        }
        self.mounted = false;
        self.scroll_dirty = false;
    }

    /// Committed active index. Defined (0 before any commit) once cards exist.
    pub fn active_index(&self) -> Option<usize> {
        if self.cards.is_empty() {
            return None;
        }
        Some(self.debouncer.committed().unwrap_or(0))
    }

    /// Step-count progress over committed cards: discrete, predictable jumps
    /// tied to the active card rather than continuous scroll noise.
    pub fn progress_percent(&self) -> u32 {
        let count = self.cards.len();
        if count <= 1 {
            return 100;
        }
        let active = self.active_index().unwrap_or(0);
        ((active as f32 / (count - 1) as f32) * 100.0).round() as u32
    }

    /// Push one visibility observation batch from the host.
    pub fn on_visibility_batch(&mut self, samples: &[VisibilitySample], now: Timestamp) {
        if !self.mounted {
            return;
        }
        if let Some(candidate) = self.voter.observe_batch(samples) {
            self.debouncer.propose(candidate, now);
        }
    }

    /// Scroll, resize, or fresh-measurement signal. Only marks the frame dirty;
    /// the actual recomputation happens once, on the next frame tick, no matter
    /// how many such signals arrive in between.
    pub fn on_scroll(&mut self) {
        if !self.mounted {
            return;
        }
        self.scroll_dirty = true;
    }

    /// Animation-frame tick: refresh geometry/progress first, then resolve any
    /// elapsed debounce, then advance the smoother. The smoother therefore never
    /// sees a stale target for more than one tick.
    pub fn on_frame(&mut self, host: &mut dyn ViewportHost, now: Timestamp) {
        if !self.mounted {
            return;
        }

        self.reduced_motion = host.prefers_reduced_motion();

        if self.scroll_dirty {
            if let Some(region) = self.sampler.region(host) {
                self.progress_t = self.mapper.progress(&region);
                self.target = self.mapper.target_point(&region, self.progress_t);
                self.scroll_dirty = false;
            }
            // Measurement unavailable: keep the previous target, stay dirty so
            // the next frame retries.
        }

        match self.debouncer.poll(now) {
            Some(CommitOutcome::Committed(_)) => {}
            Some(CommitOutcome::DroppedLocked(_))
            | Some(CommitOutcome::DroppedBelowThreshold(_)) => {
                // A change-driven observer will not re-deliver a dropped winner
                // unless the voter forgets it first.
                self.voter.forget_winner();
            }
            None => {}
        }

        self.smoother.tick(
            now,
            self.target,
            self.progress_t,
            self.config.smoothing_tau_us,
            self.config.max_frame_dt_us,
            self.reduced_motion,
        );
    }

    /// Manual override: immediately activates `index`, locks out automatic
    /// commits for the configured window, and asks the host to center the card.
    /// Out-of-range indices are silently ignored.
    pub fn request_activate(&mut self, host: &mut dyn ViewportHost, index: usize, now: Timestamp) {
        if !self.mounted || index >= self.cards.len() {
            return;
        }
        self.debouncer.activate(index, now);
        self.voter.forget_winner();

        let behavior = if host.prefers_reduced_motion() {
            ScrollBehavior::Immediate
        } else {
            ScrollBehavior::Smooth
        };
        host.scroll_to(self.cards[index].handle, behavior);
    }

    /// Render-ready snapshot; `None` while the card list is empty (inert state).
    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        let active_index = self.active_index()?;
        let halo = self.smoother.render(&self.config.halo, self.reduced_motion);

        Some(RenderSnapshot {
            active_index,
            cards: self
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| CardRender {
                    key: card.spec.key.clone(),
                    is_active: i == active_index,
                })
                .collect(),
            cursor: halo.position,
            core_size: halo.core_size,
            glow_size: halo.glow_size,
            core_opacity: halo.core_opacity,
            glow_opacity: halo.glow_opacity,
            progress_percent: self.progress_percent(),
            scroll_request: None,
        })
    }

    #[cfg(test)]
    pub(crate) fn target(&self) -> Point {
        self.target
    }

    #[cfg(test)]
    pub(crate) fn smoothed_position(&self) -> Point {
        self.smoother.position()
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Top-level config passed from JS: rail settings plus the card sequence.
#[derive(Debug, Clone, Deserialize)]
struct RailSetup {
    #[serde(default)]
    config: RailConfig,
    cards: Vec<CardSpec>,
}

/// Card keys are the render identity; an empty or duplicate key would make the
/// per-card `is_active` flags ambiguous for the host.
fn validate_cards(specs: &[CardSpec]) -> Result<(), RailError> {
    let mut seen = HashSet::new();
    for spec in specs {
        if spec.key.is_empty() {
            return Err(RailError::InvalidCards("empty card key".to_string()));
        }
        if !seen.insert(spec.key.as_str()) {
            return Err(RailError::InvalidCards(format!(
                "duplicate card key {:?}",
                spec.key
            )));
        }
    }
    Ok(())
}

/// WASM-exposed rail for JavaScript interop. Batch interface: the JS host
/// measures the DOM and forwards signal batches; this wrapper applies them in
/// order and hands back one render snapshot per call.
#[wasm_bindgen]
pub struct Rail {
    controller: RailController,
    host: MeasuredHost,
}

#[wasm_bindgen]
impl Rail {
    /// Create a rail from JSON setup: `{ "config": {...}, "cards": [...] }`.
    /// Omitted config fields fall back to the tuned defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(setup_json: &str) -> Result<Rail, JsValue> {
        let setup: RailSetup = serde_json::from_str(setup_json)
            .map_err(|e| RailError::InvalidConfig(e.to_string()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        validate_cards(&setup.cards).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Rail {
            controller: RailController::new(setup.cards, setup.config),
            host: MeasuredHost::new(),
        })
    }

    /// Apply a batch of host signals in order and return the resulting render
    /// snapshot as JSON (`null` while the rail is inert).
    pub fn process_signals(&mut self, signals_json: &str) -> Result<String, JsValue> {
        let batch: SignalBatch = serde_json::from_str(signals_json)
            .map_err(|e| RailError::InvalidSignal(e.to_string()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        for signal in batch.signals {
            self.apply(signal.kind, signal.timestamp);
        }

        let mut snapshot = self.controller.snapshot();
        if let Some(snapshot) = snapshot.as_mut() {
            snapshot.scroll_request = self.host.take_scroll_request();
        }

        serde_json::to_string(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Committed active index, or -1 while the rail is inert.
    pub fn active_index(&self) -> i32 {
        self.controller
            .active_index()
            .map(|i| i as i32)
            .unwrap_or(-1)
    }

    pub fn progress_percent(&self) -> u32 {
        self.controller.progress_percent()
    }

    /// Fraction the host shaves off the top/bottom of the observation window.
    pub fn observe_margin_fraction(&self) -> f32 {
        self.controller.config().observe_margin_fraction
    }

    /// Ratio breakpoints the host registers with its observer.
    pub fn observe_thresholds(&self) -> Vec<f32> {
        self.controller.config().observe_thresholds.clone()
    }

    pub fn unmount(&mut self) {
        self.controller.unmount();
    }

    fn apply(&mut self, kind: SignalKind, now: Timestamp) {
        match kind {
            SignalKind::Geometry {
                region,
                viewport_height,
                scroll_y,
                reduced_motion,
            } => {
                self.host.set_viewport_height(viewport_height);
                self.host.set_scroll_y(scroll_y);
                self.host.set_reduced_motion(reduced_motion);

                let region_handle = self.controller.region_handle();
                match region {
                    Some(rect) => self.host.set_rect(region_handle, rect),
                    None => self.host.clear_rect(region_handle),
                }
                // New measurements invalidate the derived progress/target.
                self.controller.on_scroll();
            }
            SignalKind::Visibility { samples } => {
                self.controller.on_visibility_batch(&samples, now);
            }
            SignalKind::Scroll | SignalKind::Resize => {
                self.controller.on_scroll();
            }
            SignalKind::Frame => {
                self.controller.on_frame(&mut self.host, now);
            }
            SignalKind::Activate { index } => {
                self.controller.request_activate(&mut self.host, index, now);
            }
        }
    }
}
