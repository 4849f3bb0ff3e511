use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{BookGraph, CharacterNode};
use crate::names::{CHARACTER_NAMES, QUOTE_TEMPLATES, TARGET_SLOT};
use crate::policy::{PollOutcome, SynthPolicy};
use crate::random::{RandomSource, sample, shuffle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Downloading,
    Processing,
    Processed,
}

impl AnalysisStatus {
    /// Polling stops once this status is seen
    pub fn is_terminal(self) -> bool {
        self == Self::Processed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub character_id: String,
    pub character_name: String,
    pub text: String,
    pub sentiment: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<BookGraph>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

/// Small in-progress graph: 2-4 characters around one hub.
///
/// With `policy.out_of_order` probability the analysis "finishes early" and a
/// full [`generate_random_graph`] result is returned instead.
pub fn generate_processing_graph<R: RandomSource + ?Sized>(
    rng: &mut R,
    policy: &SynthPolicy,
) -> AnalysisResponse {
    if rng.chance(policy.out_of_order) {
        debug!("Processing poll completed out of order");
        return generate_random_graph(rng, policy);
    }

    let (graph, _hub) = sparse_graph(rng, policy);
    let quotes = generate_quotes(rng, &graph.nodes, policy);
    AnalysisResponse {
        status: AnalysisStatus::Processing,
        graph: Some(graph),
        quotes,
    }
}

/// Sparse graph and the index of its hub
fn sparse_graph<R: RandomSource + ?Sized>(rng: &mut R, policy: &SynthPolicy) -> (BookGraph, usize) {
    let num_characters = rng.between(2, 4) as usize;
    let names = sample(rng, &CHARACTER_NAMES, num_characters);
    let mut graph = BookGraph::with_characters(&names);
    let n = graph.nodes.len();
    let hub = rng.below(n);

    for idx in 0..n {
        if idx == hub {
            let num_connections = rng.between(1, 2) as usize;
            let mut targets: Vec<usize> = (0..n).filter(|&i| i != hub).collect();
            shuffle(rng, &mut targets);
            targets.truncate(num_connections);

            for target in targets {
                let weight = rng.between(1, 20);
                graph.connect(hub, target, weight);
            }
        } else if rng.chance(policy.spoke_link) {
            let weight = rng.between(1, 20);
            graph.connect(idx, hub, weight);
        }
    }

    (graph, hub)
}

/// Finished graph: 10-15 characters clustered around 2-3 hubs
pub fn generate_random_graph<R: RandomSource + ?Sized>(
    rng: &mut R,
    policy: &SynthPolicy,
) -> AnalysisResponse {
    let (graph, _hubs) = dense_graph(rng, policy);
    let quotes = generate_quotes(rng, &graph.nodes, policy);
    AnalysisResponse {
        status: AnalysisStatus::Processed,
        graph: Some(graph),
        quotes,
    }
}

/// Dense graph and the indices of its hubs
fn dense_graph<R: RandomSource + ?Sized>(rng: &mut R, policy: &SynthPolicy) -> (BookGraph, Vec<usize>) {
    let num_characters = rng.between(10, 15) as usize;
    let names = sample(rng, &CHARACTER_NAMES, num_characters);
    let mut graph = BookGraph::with_characters(&names);
    let n = graph.nodes.len();

    let num_hubs = rng.between(2, 3) as usize;
    let indices: Vec<usize> = (0..n).collect();
    let hubs = sample(rng, &indices, num_hubs);
    let non_hubs: Vec<usize> = indices.iter().copied().filter(|i| !hubs.contains(i)).collect();

    for idx in 0..n {
        if hubs.contains(&idx) {
            let num_connections = rng.between(3, 5) as usize;
            for target in sample(rng, &non_hubs, num_connections) {
                let weight = rng.between(20, 99);
                graph.connect(idx, target, weight);
            }
        } else {
            if rng.chance(policy.non_hub_link) {
                let others: Vec<usize> = non_hubs.iter().copied().filter(|&i| i != idx).collect();
                if !others.is_empty() {
                    let target = others[rng.below(others.len())];
                    let weight = rng.between(10, 49);
                    graph.connect(idx, target, weight);
                }
            }

            let num_hub_connections = rng.between(1, 2) as usize;
            for hub in sample(rng, &hubs, num_hub_connections) {
                let weight = rng.between(20, 99);
                graph.connect(idx, hub, weight);
            }
        }
    }

    (graph, hubs)
}

/// Each character has a `policy.quote` chance of one quote about another
pub fn generate_quotes<R: RandomSource + ?Sized>(
    rng: &mut R,
    nodes: &[CharacterNode],
    policy: &SynthPolicy,
) -> Vec<Quote> {
    let mut quotes = Vec::new();

    for character in nodes {
        if !rng.chance(policy.quote) {
            continue;
        }

        let others: Vec<&CharacterNode> = nodes.iter().filter(|c| c.id != character.id).collect();
        if others.is_empty() {
            continue;
        }
        let target = others[rng.below(others.len())];
        let template = QUOTE_TEMPLATES[rng.below(QUOTE_TEMPLATES.len())];

        quotes.push(Quote {
            character_id: character.id.clone(),
            character_name: character.name.clone(),
            text: template.replacen(TARGET_SLOT, &target.name, 1),
            sentiment: rng.between(0, 100),
        });
    }

    quotes
}

/// In flight, nothing found yet
pub fn early_response() -> AnalysisResponse {
    AnalysisResponse {
        status: AnalysisStatus::Processing,
        graph: Some(BookGraph::default()),
        quotes: Vec::new(),
    }
}

/// Answer to a status poll, chosen per `policy` regardless of the book
pub fn poll_response<R: RandomSource + ?Sized>(rng: &mut R, policy: &SynthPolicy) -> AnalysisResponse {
    match policy.choose_poll_outcome(rng) {
        PollOutcome::Sparse => generate_processing_graph(rng, policy),
        PollOutcome::Early => early_response(),
        PollOutcome::Complete => generate_random_graph(rng, policy),
    }
}
