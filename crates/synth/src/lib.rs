//! Synthetic character-interaction graphs and quotes for the analysis demo.
//!
//! Nothing here looks at book content. Every generator draws from a
//! [`RandomSource`] and branches on the probabilities in a [`SynthPolicy`].

pub mod generator;
pub mod graph;
pub mod names;
pub mod policy;
pub mod random;

pub use generator::{
    AnalysisResponse, AnalysisStatus, Quote, early_response, generate_processing_graph,
    generate_quotes, generate_random_graph, poll_response,
};
pub use graph::{BookGraph, CharacterNode, InteractionEdge};
pub use policy::{PollOutcome, SynthPolicy};
pub use random::{RandomSource, SequenceRandom, SystemRandom};
