// Halo cursor smoothing. Discrete EMA low-pass filter: frame-rate-independent
// (same time constant regardless of tick spacing) and settles without overshoot.
// The smoothed point and pulse are the only stateful time integrals in the engine.

use crate::types::{HaloConfig, Point, Timestamp};

/// Close enough, in pixels / pulse units, to stop chasing a settled target.
const SETTLE_EPSILON: f32 = 0.001;

/// Rendered halo state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaloState {
    pub position: Point,
    pub core_size: f32,
    pub glow_size: f32,
    pub core_opacity: f32,
    pub glow_opacity: f32,
}

/// Exponentially smooths the target point and pulsation toward their raw values
/// on every animation frame.
#[derive(Debug)]
pub struct CursorSmoother {
    position: Point,
    pulse: f32,
    last_tick: Option<Timestamp>,
}

impl CursorSmoother {
    pub fn new() -> Self {
        CursorSmoother {
            position: Point::default(),
            pulse: 0.0,
            last_tick: None,
        }
    }

    /// Advance one frame toward `target`. `raw_t` is the unsmoothed scroll
    /// progress; the pulse target is its triangular wave `1 - |2t - 1|`,
    /// peaking mid-region. Reduced motion bypasses smoothing entirely.
    pub fn tick(
        &mut self,
        now: Timestamp,
        target: Point,
        raw_t: f32,
        tau_us: u64,
        max_dt_us: u64,
        reduced_motion: bool,
    ) {
        let pulse_target = 1.0 - (2.0 * raw_t.clamp(0.0, 1.0) - 1.0).abs();

        let last = self.last_tick.replace(now);

        // First frame and reduced motion both snap; there is nothing sensible to
        // animate from, and reduced motion must not animate at all.
        let Some(last) = last else {
            self.position = target;
            self.pulse = pulse_target;
            return;
        };
        if reduced_motion {
            self.position = target;
            self.pulse = pulse_target;
            return;
        }

        let dt_us = now.micros_since(last).min(max_dt_us);
        let alpha = 1.0 - (-(dt_us as f32) / (tau_us.max(1) as f32)).exp();

        self.position.x = approach(self.position.x, target.x, alpha);
        self.position.y = approach(self.position.y, target.y, alpha);
        self.pulse = approach(self.pulse, pulse_target, alpha);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    /// Map the smoothed pulse onto the configured halo size/opacity ranges.
    pub fn render(&self, halo: &HaloConfig, reduced_motion: bool) -> HaloState {
        if reduced_motion {
            return HaloState {
                position: self.position,
                core_size: halo.reduced_core_size,
                glow_size: halo.reduced_glow_size,
                core_opacity: halo.reduced_core_opacity,
                glow_opacity: halo.reduced_glow_opacity,
            };
        }

        let pulse = self.pulse.clamp(0.0, 1.0);
        HaloState {
            position: self.position,
            core_size: halo.core_size_base + pulse * halo.core_size_span,
            glow_size: halo.glow_size_base + pulse * halo.glow_size_span,
            core_opacity: halo.core_opacity_base + pulse * halo.core_opacity_span,
            glow_opacity: halo.glow_opacity_base + pulse * halo.glow_opacity_span,
        }
    }
}

impl Default for CursorSmoother {
    fn default() -> Self {
        Self::new()
    }
}

fn approach(current: f32, target: f32, alpha: f32) -> f32 {
    let diff = target - current;
    if diff.abs() < SETTLE_EPSILON {
        return target;
    }
    current + diff * alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAU_US: u64 = 1_400_000;
    const MAX_DT_US: u64 = 64_000;

    fn at_ms(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn tick(s: &mut CursorSmoother, ms: u64, target: Point, t: f32) {
        s.tick(at_ms(ms), target, t, TAU_US, MAX_DT_US, false);
    }

    #[test]
    fn first_tick_snaps_to_target() {
        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::new(180.0, 820.0), 0.0);
        assert_eq!(s.position(), Point::new(180.0, 820.0));
    }

    #[test]
    fn converges_within_one_percent_after_five_tau() {
        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::new(0.0, 0.0), 0.0);

        let target = Point::new(1000.0, 400.0);
        // 16ms frames for 7s > 5 * tau (1.4s).
        let mut now = 0;
        while now < 7_000 {
            now += 16;
            tick(&mut s, now, target, 1.0);
        }

        assert!((s.position().x - target.x).abs() <= 10.0);
        assert!((s.position().y - target.y).abs() <= 4.0);
    }

    #[test]
    fn settled_smoother_stays_at_rest() {
        let mut s = CursorSmoother::new();
        let target = Point::new(500.0, 500.0);
        tick(&mut s, 0, target, 0.5);
        tick(&mut s, 16, target, 0.5);
        assert_eq!(s.position(), target);
        assert_eq!(s.pulse(), 1.0);
    }

    #[test]
    fn long_stall_counts_as_one_clamped_step() {
        let mut a = CursorSmoother::new();
        let mut b = CursorSmoother::new();
        let target = Point::new(800.0, 200.0);

        tick(&mut a, 0, Point::new(0.0, 0.0), 0.0);
        tick(&mut b, 0, Point::new(0.0, 0.0), 0.0);

        // a: one tick after a 2s stall; b: one 64ms tick. Identical step.
        tick(&mut a, 2_000, target, 0.0);
        tick(&mut b, 64, target, 0.0);
        assert!((a.position().x - b.position().x).abs() < 1e-3);
    }

    #[test]
    fn reduced_motion_snaps_every_tick() {
        let mut s = CursorSmoother::new();
        s.tick(at_ms(0), Point::new(0.0, 0.0), 0.0, TAU_US, MAX_DT_US, true);
        s.tick(
            at_ms(16),
            Point::new(900.0, 100.0),
            1.0,
            TAU_US,
            MAX_DT_US,
            true,
        );
        assert_eq!(s.position(), Point::new(900.0, 100.0));
    }

    #[test]
    fn pulse_is_triangular_in_progress() {
        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::default(), 0.5);
        assert!((s.pulse() - 1.0).abs() < 1e-6);

        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::default(), 0.0);
        assert!(s.pulse().abs() < 1e-6);

        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::default(), 0.75);
        assert!((s.pulse() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn render_maps_pulse_onto_configured_ranges() {
        let halo = HaloConfig::default();
        let mut s = CursorSmoother::new();
        tick(&mut s, 0, Point::default(), 0.5); // pulse = 1

        let state = s.render(&halo, false);
        assert!((state.core_size - 210.0).abs() < 1e-3); // 140 + 70
        assert!((state.glow_size - 580.0).abs() < 1e-3); // 320 + 260
        assert!((state.core_opacity - 0.36).abs() < 1e-4);
        assert!((state.glow_opacity - 0.16).abs() < 1e-4);
    }

    #[test]
    fn render_reduced_motion_uses_fixed_values() {
        let halo = HaloConfig::default();
        let s = CursorSmoother::new();
        let state = s.render(&halo, true);
        assert_eq!(state.core_size, 160.0);
        assert_eq!(state.glow_size, 360.0);
        assert!((state.core_opacity - 0.22).abs() < 1e-4);
        assert!((state.glow_opacity - 0.10).abs() < 1e-4);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// EMA never overshoots: each step lands between the previous value
            /// and the target, for any frame spacing.
            #[test]
            fn no_overshoot(
                start in -1_000.0f32..1_000.0,
                target in -1_000.0f32..1_000.0,
                dts in prop::collection::vec(1u64..200, 1..50),
            ) {
                let mut s = CursorSmoother::new();
                tick(&mut s, 0, Point::new(start, 0.0), 0.0);

                let mut now = 0;
                let mut prev = start;
                for dt in dts {
                    now += dt;
                    tick(&mut s, now, Point::new(target, 0.0), 0.0);
                    let x = s.position().x;
                    let lo = prev.min(target) - 1e-3;
                    let hi = prev.max(target) + 1e-3;
                    prop_assert!(x >= lo && x <= hi);
                    prev = x;
                }
            }

            /// After at least 5 tau of accumulated (clamped) time at 16ms frames,
            /// the smoother is within 1% of the jump distance.
            #[test]
            fn converges_for_any_target(target in -5_000.0f32..5_000.0) {
                let mut s = CursorSmoother::new();
                tick(&mut s, 0, Point::new(0.0, 0.0), 0.0);

                let mut now = 0;
                while now < 8_000 {
                    now += 16;
                    tick(&mut s, now, Point::new(target, 0.0), 0.0);
                }
                prop_assert!((s.position().x - target).abs() <= target.abs() * 0.01 + 0.01);
            }
        }
    }
}
