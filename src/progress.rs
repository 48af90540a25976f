// Scroll progress and the halo's curved path. Progress is recomputed from live
// geometry on every signal, never accumulated, so it cannot drift.

use crate::geometry::RegionGeometry;
use crate::types::{CurveConfig, Point};

/// Maps scroll position onto t in [0,1] and t onto a point along a fixed
/// quadratic Bezier across the tracked region.
#[derive(Debug, Clone, Copy)]
pub struct ProgressMapper {
    curve: CurveConfig,
}

impl ProgressMapper {
    pub fn new(curve: CurveConfig) -> Self {
        ProgressMapper { curve }
    }

    /// Normalized progress through the tracked region.
    ///
    /// Defined as `(viewport_center - (region_top + vh/2)) / (region_span - vh)`
    /// in absolute coordinates; with viewport-relative rects the scroll offset
    /// cancels out and this reduces to `-top / max(1, height - vh)`. t reaches 0
    /// while the region top is still at or below the viewport top and 1 only once
    /// the region bottom has risen to the viewport bottom, so short lists never
    /// report 100% prematurely.
    pub fn progress(&self, region: &RegionGeometry) -> f32 {
        let span = (region.rect.height - region.viewport_height).max(1.0);
        (-region.rect.top / span).clamp(0.0, 1.0)
    }

    /// Quadratic Bezier at `t`, scaled into region-local pixels.
    pub fn target_point(&self, region: &RegionGeometry, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let [x, y] = quad_bezier(self.curve.start, self.curve.control, self.curve.end, t);
        Point::new(x * region.rect.width, y * region.rect.height)
    }
}

fn quad_bezier(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], t: f32) -> [f32; 2] {
    let u = 1.0 - t;
    let w0 = u * u;
    let w1 = 2.0 * u * t;
    let w2 = t * t;
    [
        w0 * p0[0] + w1 * p1[0] + w2 * p2[0],
        w0 * p0[1] + w1 * p1[1] + w2 * p2[1],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ViewRect;

    fn region(top: f32, height: f32, viewport_height: f32) -> RegionGeometry {
        RegionGeometry {
            rect: ViewRect::new(top, 0.0, 1000.0, height),
            viewport_height,
        }
    }

    fn mapper() -> ProgressMapper {
        ProgressMapper::new(CurveConfig::default())
    }

    #[test]
    fn progress_zero_until_region_top_passes_viewport_top() {
        let m = mapper();
        assert_eq!(m.progress(&region(400.0, 4000.0, 800.0)), 0.0);
        assert_eq!(m.progress(&region(0.0, 4000.0, 800.0)), 0.0);
    }

    #[test]
    fn progress_one_once_region_bottom_reaches_viewport_bottom() {
        let m = mapper();
        // height - vh = 3200; top = -3200 puts the bottom exactly at the viewport bottom.
        assert_eq!(m.progress(&region(-3200.0, 4000.0, 800.0)), 1.0);
        assert_eq!(m.progress(&region(-5000.0, 4000.0, 800.0)), 1.0);
    }

    #[test]
    fn progress_midpoint() {
        let m = mapper();
        let t = m.progress(&region(-1600.0, 4000.0, 800.0));
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn short_region_clamps_instead_of_dividing_by_zero() {
        let m = mapper();
        // Region shorter than the viewport: span clamps to 1px.
        let t = m.progress(&region(-10.0, 600.0, 800.0));
        assert_eq!(t, 1.0);
        assert_eq!(m.progress(&region(5.0, 600.0, 800.0)), 0.0);
    }

    #[test]
    fn bezier_endpoints_are_exact() {
        let m = mapper();
        let r = region(0.0, 1000.0, 800.0);

        let start = m.target_point(&r, 0.0);
        assert!((start.x - 0.18 * 1000.0).abs() < 1e-3);
        assert!((start.y - 0.82 * 1000.0).abs() < 1e-3);

        let end = m.target_point(&r, 1.0);
        assert!((end.x - 0.82 * 1000.0).abs() < 1e-3);
        assert!((end.y - 0.82 * 1000.0).abs() < 1e-3);
    }

    #[test]
    fn bezier_midpoint_is_exact() {
        let m = mapper();
        let r = region(0.0, 1000.0, 800.0);
        let mid = m.target_point(&r, 0.5);

        // B(0.5) = 0.25*P0 + 0.5*P1 + 0.25*P2
        let x = 0.25 * 0.18 + 0.5 * 0.50 + 0.25 * 0.82;
        let y = 0.25 * 0.82 + 0.5 * 0.22 + 0.25 * 0.82;
        assert!((mid.x - x * 1000.0).abs() < 1e-3);
        assert!((mid.y - y * 1000.0).abs() < 1e-3);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// t stays inside [0,1] for any geometry the host could measure.
            #[test]
            fn progress_is_always_in_unit_range(
                top in -20_000.0f32..20_000.0,
                height in 1.0f32..20_000.0,
                viewport_height in 1.0f32..5_000.0,
            ) {
                let m = mapper();
                let t = m.progress(&region(top, height, viewport_height));
                prop_assert!((0.0..=1.0).contains(&t));
            }

            /// For fixed region geometry, progress is monotone non-decreasing as
            /// the viewport center moves down (the rect's top moves up).
            #[test]
            fn progress_is_monotone_in_scroll(
                top in -10_000.0f32..10_000.0,
                delta in 0.0f32..5_000.0,
                height in 900.0f32..20_000.0,
            ) {
                let m = mapper();
                let before = m.progress(&region(top, height, 800.0));
                let after = m.progress(&region(top - delta, height, 800.0));
                prop_assert!(after >= before);
            }

            /// The curve never leaves the region's bounding box when the control
            /// fractions are inside the unit square.
            #[test]
            fn target_point_stays_in_region(t in 0.0f32..=1.0) {
                let m = mapper();
                let r = region(0.0, 2_000.0, 800.0);
                let p = m.target_point(&r, t);
                prop_assert!(p.x >= 0.0 && p.x <= r.rect.width);
                prop_assert!(p.y >= 0.0 && p.y <= r.rect.height);
            }
        }
    }
}
