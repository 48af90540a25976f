// Strong typing over strings. Newtypes for timestamps, element handles, and pixel units.

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms * 1000)
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Microseconds elapsed since `earlier` (zero if `earlier` is in the future).
    pub fn micros_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn saturating_add_micros(&self, us: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(us))
    }
}

/// Opaque handle to a host-side element (a rendered card or the tracked region).
/// The host maps handles to live layout boxes; the engine never caches a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(u32);

impl ElementHandle {
    pub fn new(id: u32) -> Self {
        ElementHandle(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Point in region-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Bounding rectangle relative to the current viewport, in pixels.
/// `top` is negative once the element has scrolled above the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewRect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        ViewRect {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Scroll-into-view behavior requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Immediate,
}

/// Card display payload as supplied by the content provider. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSpec {
    /// Stable identity (slug).
    pub key: String,
    pub title: String,
    pub summary: String,
    pub image_ref: String,
    pub href: String,
    #[serde(default)]
    pub secondary_href: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A registered card: payload plus the handle whose bounding box is re-read on demand.
#[derive(Debug, Clone)]
pub struct Card {
    pub spec: CardSpec,
    pub handle: ElementHandle,
}

/// The Visibility Voter's best current guess. Ephemeral, overwritten per batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub ratio: f32,
}

/// One card's visibility report from the observation host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibilitySample {
    pub index: usize,
    pub ratio: f32,
    pub is_intersecting: bool,
}

/// Quadratic Bezier control points as fractions of the tracked region's local size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurveConfig {
    #[serde(default = "default_curve_start")]
    pub start: [f32; 2],
    #[serde(default = "default_curve_control")]
    pub control: [f32; 2],
    #[serde(default = "default_curve_end")]
    pub end: [f32; 2],
}

fn default_curve_start() -> [f32; 2] {
    [0.18, 0.82]
}

fn default_curve_control() -> [f32; 2] {
    [0.50, 0.22]
}

fn default_curve_end() -> [f32; 2] {
    [0.82, 0.82]
}

impl Default for CurveConfig {
    fn default() -> Self {
        CurveConfig {
            start: default_curve_start(),
            control: default_curve_control(),
            end: default_curve_end(),
        }
    }
}

/// Halo size/opacity ranges. The pulse (0..1) maps linearly over `base + pulse * span`;
/// reduced-motion uses the fixed `reduced_*` values instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HaloConfig {
    #[serde(default = "default_core_size_base")]
    pub core_size_base: f32,
    #[serde(default = "default_core_size_span")]
    pub core_size_span: f32,
    #[serde(default = "default_glow_size_base")]
    pub glow_size_base: f32,
    #[serde(default = "default_glow_size_span")]
    pub glow_size_span: f32,
    #[serde(default = "default_core_opacity_base")]
    pub core_opacity_base: f32,
    #[serde(default = "default_core_opacity_span")]
    pub core_opacity_span: f32,
    #[serde(default = "default_glow_opacity_base")]
    pub glow_opacity_base: f32,
    #[serde(default = "default_glow_opacity_span")]
    pub glow_opacity_span: f32,
    #[serde(default = "default_reduced_core_size")]
    pub reduced_core_size: f32,
    #[serde(default = "default_reduced_glow_size")]
    pub reduced_glow_size: f32,
    #[serde(default = "default_reduced_core_opacity")]
    pub reduced_core_opacity: f32,
    #[serde(default = "default_reduced_glow_opacity")]
    pub reduced_glow_opacity: f32,
}

fn default_core_size_base() -> f32 {
    140.0
}

fn default_core_size_span() -> f32 {
    70.0
}

fn default_glow_size_base() -> f32 {
    320.0
}

fn default_glow_size_span() -> f32 {
    260.0
}

fn default_core_opacity_base() -> f32 {
    0.18
}

fn default_core_opacity_span() -> f32 {
    0.18
}

fn default_glow_opacity_base() -> f32 {
    0.06
}

fn default_glow_opacity_span() -> f32 {
    0.10
}

fn default_reduced_core_size() -> f32 {
    160.0
}

fn default_reduced_glow_size() -> f32 {
    360.0
}

fn default_reduced_core_opacity() -> f32 {
    0.22
}

fn default_reduced_glow_opacity() -> f32 {
    0.10
}

impl Default for HaloConfig {
    fn default() -> Self {
        HaloConfig {
            core_size_base: default_core_size_base(),
            core_size_span: default_core_size_span(),
            glow_size_base: default_glow_size_base(),
            glow_size_span: default_glow_size_span(),
            core_opacity_base: default_core_opacity_base(),
            core_opacity_span: default_core_opacity_span(),
            glow_opacity_base: default_glow_opacity_base(),
            glow_opacity_span: default_glow_opacity_span(),
            reduced_core_size: default_reduced_core_size(),
            reduced_glow_size: default_reduced_glow_size(),
            reduced_core_opacity: default_reduced_core_opacity(),
            reduced_glow_opacity: default_reduced_glow_opacity(),
        }
    }
}

/// Rail behavior settings. The thresholds and durations are empirically tuned
/// constants carried over from the shipped rail; they are configuration, not derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailConfig {
    /// A candidate below this visibility ratio is never auto-committed.
    #[serde(default = "default_min_visibility_ratio")]
    pub min_visibility_ratio: f32,
    /// Trailing debounce before a candidate becomes the active card (microseconds).
    #[serde(default = "default_debounce_us")]
    pub debounce_us: u64,
    /// Suppression window for automatic commits after a manual activate (microseconds).
    #[serde(default = "default_manual_lock_us")]
    pub manual_lock_us: u64,
    /// EMA time constant for the halo cursor (microseconds).
    #[serde(default = "default_smoothing_tau_us")]
    pub smoothing_tau_us: u64,
    /// Upper bound on a single smoothing step, so a stalled tab cannot teleport the halo.
    #[serde(default = "default_max_frame_dt_us")]
    pub max_frame_dt_us: u64,
    /// Fraction shaved off the top and bottom of the observation window, biasing
    /// visibility ratios toward the vertical center of the viewport.
    #[serde(default = "default_observe_margin_fraction")]
    pub observe_margin_fraction: f32,
    /// Ratio breakpoints at which the observation host reports changes.
    #[serde(default = "default_observe_thresholds")]
    pub observe_thresholds: Vec<f32>,
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub halo: HaloConfig,
}

fn default_min_visibility_ratio() -> f32 {
    0.22
}

fn default_debounce_us() -> u64 {
    140_000
}

fn default_manual_lock_us() -> u64 {
    900_000
}

fn default_smoothing_tau_us() -> u64 {
    1_400_000
}

fn default_max_frame_dt_us() -> u64 {
    64_000
}

fn default_observe_margin_fraction() -> f32 {
    0.30
}

fn default_observe_thresholds() -> Vec<f32> {
    vec![0.0, 0.25, 0.5, 0.75, 1.0]
}

impl Default for RailConfig {
    fn default() -> Self {
        RailConfig {
            min_visibility_ratio: default_min_visibility_ratio(),
            debounce_us: default_debounce_us(),
            manual_lock_us: default_manual_lock_us(),
            smoothing_tau_us: default_smoothing_tau_us(),
            max_frame_dt_us: default_max_frame_dt_us(),
            observe_margin_fraction: default_observe_margin_fraction(),
            observe_thresholds: default_observe_thresholds(),
            curve: CurveConfig::default(),
            halo: HaloConfig::default(),
        }
    }
}

/// Batch of input signals from the host (minimizes JS↔WASM crossings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBatch {
    pub signals: Vec<RailSignal>,
}

/// Single timestamped signal from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailSignal {
    pub timestamp: Timestamp,
    pub kind: SignalKind,
}

/// Kind of host signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// Fresh measurements: tracked-region rect, viewport height, scroll offset,
    /// and the reduced-motion preference.
    Geometry {
        region: Option<ViewRect>,
        viewport_height: f32,
        scroll_y: f32,
        #[serde(default)]
        reduced_motion: bool,
    },
    /// Visibility observation batch (irregular cadence, push-based).
    Visibility { samples: Vec<VisibilitySample> },
    /// Scroll event. Coalesced: at most one recomputation per rendered frame.
    Scroll,
    /// Resize event. Same coalescing path as scroll.
    Resize,
    /// Animation-frame tick.
    Frame,
    /// Manual "jump to card" request.
    Activate { index: usize },
}

/// Per-card render state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRender {
    pub key: String,
    pub is_active: bool,
}

/// Pending programmatic scroll for the host to execute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub handle: ElementHandle,
    pub behavior: ScrollBehavior,
}

/// Render-ready snapshot consumed read-only by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub active_index: usize,
    pub cards: Vec<CardRender>,
    /// Smoothed halo position in region-local pixels.
    pub cursor: Point,
    pub core_size: f32,
    pub glow_size: f32,
    pub core_opacity: f32,
    pub glow_opacity: f32,
    /// Step-count metric over committed cards, not raw scroll progress.
    pub progress_percent: u32,
    #[serde(default)]
    pub scroll_request: Option<ScrollRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_millis(1500);
        assert_eq!(ts.as_micros(), 1_500_000);
        assert!((ts.as_millis() - 1500.0).abs() < 0.0001);
    }

    #[test]
    fn micros_since_saturates() {
        let a = Timestamp::from_micros(100);
        let b = Timestamp::from_micros(400);
        assert_eq!(b.micros_since(a), 300);
        assert_eq!(a.micros_since(b), 0);
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config: RailConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.min_visibility_ratio, 0.22);
        assert_eq!(config.debounce_us, 140_000);
        assert_eq!(config.manual_lock_us, 900_000);
        assert_eq!(config.smoothing_tau_us, 1_400_000);
        assert_eq!(config.curve.control, [0.50, 0.22]);
        assert_eq!(config.halo.core_size_base, 140.0);
        assert_eq!(config.observe_margin_fraction, 0.30);
        assert_eq!(config.observe_thresholds, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn config_overrides_single_field() {
        let config: RailConfig = serde_json::from_str(r#"{"debounce_us": 200000}"#).unwrap();
        assert_eq!(config.debounce_us, 200_000);
        assert_eq!(config.manual_lock_us, 900_000);
    }

    #[test]
    fn view_rect_edges() {
        let r = ViewRect::new(-50.0, 0.0, 300.0, 200.0);
        assert_eq!(r.bottom(), 150.0);
        assert_eq!(r.center_y(), 50.0);
    }
}
