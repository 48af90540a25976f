// rail_core: scroll-synced rail engine for the web host.
// All "magic" lives here; JS is plumbing. The host measures the DOM, forwards
// batched signals (geometry, visibility, scroll, frames, activates), and paints
// the render snapshot this engine hands back.

mod debounce;
mod error;
mod geometry;
mod halo;
mod host;
mod progress;
mod rail;
mod types;
mod visibility;

use wasm_bindgen::prelude::*;

pub use debounce::{ActiveIndexDebouncer, CommitOutcome, DebounceState};
pub use error::RailError;
pub use geometry::{GeometrySampler, RegionGeometry};
pub use halo::{CursorSmoother, HaloState};
pub use host::{MeasuredHost, ViewportHost};
pub use progress::ProgressMapper;
pub use rail::{Rail, RailController};
pub use types::*;
pub use visibility::VisibilityVoter;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
