// Viewport capability boundary. The engine never touches the DOM: the host
// measures layout and pushes the numbers in, the engine reads them back through
// this trait, so the whole core runs against synthetic geometry in tests.

use std::collections::HashMap;

use crate::types::{ElementHandle, ScrollBehavior, ScrollRequest, ViewRect};

/// Viewport/geometry capabilities the rail needs from its host.
pub trait ViewportHost {
    /// Current viewport height in pixels.
    fn viewport_height(&self) -> f32;

    /// Bounding box of a registered element relative to the viewport.
    /// `None` means "not yet mounted"; callers skip the update.
    fn bounding_rect(&self, handle: ElementHandle) -> Option<ViewRect>;

    /// Current vertical scroll offset in pixels.
    fn scroll_y(&self) -> f32;

    /// Host-level reduced-motion preference.
    fn prefers_reduced_motion(&self) -> bool;

    /// Ask the host to scroll an element so it is centered in the viewport.
    fn scroll_to(&mut self, handle: ElementHandle, behavior: ScrollBehavior);
}

/// Host backed by the most recent geometry batch pushed over the boundary.
///
/// In production the JS side feeds it `getBoundingClientRect` results; scroll
/// requests queue up here until the host drains them from the snapshot. In tests
/// it is the deterministic stand-in for a real viewport.
#[derive(Debug, Default)]
pub struct MeasuredHost {
    rects: HashMap<ElementHandle, ViewRect>,
    viewport_height: f32,
    scroll_y: f32,
    reduced_motion: bool,
    pending_scroll: Option<ScrollRequest>,
}

impl MeasuredHost {
    pub fn new() -> Self {
        MeasuredHost::default()
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    pub fn set_scroll_y(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn set_rect(&mut self, handle: ElementHandle, rect: ViewRect) {
        self.rects.insert(handle, rect);
    }

    /// Forget a measurement (element unmounted on the host side).
    pub fn clear_rect(&mut self, handle: ElementHandle) {
        self.rects.remove(&handle);
    }

    /// Drain the pending scroll request, if any. At most one is kept; a newer
    /// request replaces an unexecuted older one.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }
}

impl ViewportHost for MeasuredHost {
    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn bounding_rect(&self, handle: ElementHandle) -> Option<ViewRect> {
        self.rects.get(&handle).copied()
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn scroll_to(&mut self, handle: ElementHandle, behavior: ScrollBehavior) {
        self.pending_scroll = Some(ScrollRequest { handle, behavior });
    }
}
