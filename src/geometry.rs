// On-demand layout measurement. No caching: every read goes back to the host so
// a re-layout between frames can never serve stale boxes.

use crate::host::ViewportHost;
use crate::types::{ElementHandle, ViewRect};

/// Tracked-region measurements needed by the Progress Mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionGeometry {
    /// Region bounding box relative to the viewport.
    pub rect: ViewRect,
    pub viewport_height: f32,
}

/// Measures the tracked region through the viewport capability. Card boxes go
/// through `ViewportHost::bounding_rect` directly with the card's handle.
/// `None` means "measurement unavailable" and the caller skips the update.
#[derive(Debug, Clone, Copy)]
pub struct GeometrySampler {
    region: ElementHandle,
}

impl GeometrySampler {
    pub fn new(region: ElementHandle) -> Self {
        GeometrySampler { region }
    }

    pub fn region_handle(&self) -> ElementHandle {
        self.region
    }

    /// Tracked-region box plus viewport height, or `None` while the region is
    /// unmounted or the viewport has no usable height yet.
    pub fn region(&self, host: &dyn ViewportHost) -> Option<RegionGeometry> {
        let viewport_height = host.viewport_height();
        if viewport_height <= 0.0 {
            return None;
        }
        let rect = host.bounding_rect(self.region)?;
        Some(RegionGeometry {
            rect,
            viewport_height,
        })
    }
}
