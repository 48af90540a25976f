// Visibility voting. The observation host watches every card against a shrunk
// viewport window (biased toward the vertical center) and pushes batched ratio
// updates; the voter turns each batch into at most one candidate proposal.
// Rule: a stable, slightly-late active card feels better than a flickering one.

use crate::types::{Candidate, VisibilitySample};

/// Keeps per-card visibility ratios and proposes the single most-visible card.
#[derive(Debug)]
pub struct VisibilityVoter {
    ratios: Vec<f32>,
    intersecting: Vec<bool>,
    /// Last index handed to the debouncer. A batch only produces a proposal when
    /// the winner differs from this.
    last_winner: Option<usize>,
}

impl VisibilityVoter {
    pub fn new(card_count: usize) -> Self {
        VisibilityVoter {
            ratios: vec![0.0; card_count],
            intersecting: vec![false; card_count],
            last_winner: None,
        }
    }

    /// Apply one observation batch. Returns a new proposal when the most-visible
    /// card changed, `None` otherwise (including when nothing intersects: the
    /// prior candidate is simply retained).
    pub fn observe_batch(&mut self, samples: &[VisibilitySample]) -> Option<Candidate> {
        for sample in samples {
            if sample.index >= self.ratios.len() {
                continue;
            }
            self.ratios[sample.index] = sample.ratio;
            self.intersecting[sample.index] = sample.is_intersecting;
        }

        let winner = self.current_winner()?;
        if Some(winner.index) == self.last_winner {
            return None;
        }
        self.last_winner = Some(winner.index);
        Some(winner)
    }

    /// Strictly-highest ratio among intersecting cards; ties keep the previous
    /// winner when it is still intersecting.
    fn current_winner(&self) -> Option<Candidate> {
        let mut best: Option<Candidate> = self.last_winner.filter(|&i| self.intersecting[i]).map(
            |index| Candidate {
                index,
                ratio: self.ratios[index],
            },
        );

        for index in 0..self.ratios.len() {
            if !self.intersecting[index] {
                continue;
            }
            let ratio = self.ratios[index];
            match best {
                Some(b) if ratio <= b.ratio => {}
                _ => best = Some(Candidate { index, ratio }),
            }
        }

        best
    }

    /// Forget the last proposal so the next batch re-proposes the current winner.
    /// Called after a candidate is dropped (lock or threshold) or after a manual
    /// override; a change-driven observer would otherwise never re-deliver it.
    pub fn forget_winner(&mut self) {
        self.last_winner = None;
    }

    #[cfg(test)]
    fn ratio(&self, index: usize) -> f32 {
        self.ratios[index]
    }
}
