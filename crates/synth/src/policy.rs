use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Every probability the synthesizer branches on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthPolicy {
    /// Poll answered with a sparse in-progress graph
    pub sparse_poll: f64,
    /// Poll answered with an empty in-progress graph; the rest complete
    pub early_poll: f64,
    /// Sparse graph request that completes early instead
    pub out_of_order: f64,
    /// Non-hub node in a sparse graph linking back to the hub
    pub spoke_link: f64,
    /// Non-hub node in a dense graph linking to another non-hub
    pub non_hub_link: f64,
    /// Node speaking a quote
    pub quote: f64,
}

impl Default for SynthPolicy {
    fn default() -> Self {
        Self {
            sparse_poll: 0.65,
            early_poll: 0.30,
            out_of_order: 0.15,
            spoke_link: 0.30,
            non_hub_link: 0.40,
            quote: 0.30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollOutcome {
    Sparse,
    Early,
    Complete,
}

impl SynthPolicy {
    /// Share of polls that come back complete
    pub fn complete_poll(&self) -> f64 {
        (1.0 - self.sparse_poll - self.early_poll).max(0.0)
    }

    pub fn choose_poll_outcome<R: RandomSource + ?Sized>(&self, rng: &mut R) -> PollOutcome {
        let roll = rng.next_unit();
        if roll < self.sparse_poll {
            PollOutcome::Sparse
        } else if roll < self.sparse_poll + self.early_poll {
            PollOutcome::Early
        } else {
            PollOutcome::Complete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SequenceRandom, SystemRandom};
    use std::collections::HashMap;

    #[test]
    fn test_thresholds_are_half_open() {
        let policy = SynthPolicy::default();
        let mut rng = SequenceRandom::new([0.0, 0.6499, 0.6501, 0.9499, 0.9501, 0.999]);
        let outcomes: Vec<_> = (0..6).map(|_| policy.choose_poll_outcome(&mut rng)).collect();

        assert_eq!(
            outcomes,
            vec![
                PollOutcome::Sparse,
                PollOutcome::Sparse,
                PollOutcome::Early,
                PollOutcome::Early,
                PollOutcome::Complete,
                PollOutcome::Complete,
            ]
        );
    }

    #[test]
    fn test_thousand_polls_approximate_split() {
        let policy = SynthPolicy::default();
        let mut rng = SystemRandom::seeded(2024);
        let mut counts: HashMap<PollOutcome, usize> = HashMap::new();
        for _ in 0..1000 {
            *counts.entry(policy.choose_poll_outcome(&mut rng)).or_default() += 1;
        }

        let sparse = counts.get(&PollOutcome::Sparse).copied().unwrap_or(0);
        let early = counts.get(&PollOutcome::Early).copied().unwrap_or(0);
        let complete = counts.get(&PollOutcome::Complete).copied().unwrap_or(0);

        assert!((590..=710).contains(&sparse), "sparse = {sparse}");
        assert!((240..=360).contains(&early), "early = {early}");
        assert!((22..=78).contains(&complete), "complete = {complete}");
    }

    #[test]
    fn test_complete_share() {
        assert!((SynthPolicy::default().complete_poll() - 0.05).abs() < 1e-9);
    }
}
