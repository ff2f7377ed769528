//! Mention indexing, co-occurrence detection and alias resolution
//!
//! Data flows through the submodules in this order: [`indexer`] rebases
//! chunk-local mentions onto the chapter text, [`cooccurrence`] pairs up
//! nearby mentions, [`alias`] groups surface forms into clusters and
//! [`alias_mapper`] rewrites mention pairs as cluster pairs.

/// Greedy alias clustering
pub mod alias;
/// Raw to resolved interaction mapping
pub mod alias_mapper;
/// Proximity co-occurrence
pub mod cooccurrence;
/// Global mention offsets
pub mod indexer;
/// Similarity scorers
pub mod similarity;

pub use alias::{distinct_surface_forms, AliasClusterer};
pub use alias_mapper::{CooccurrenceAliasMapper, InteractionSide, MappingOutcome, UnresolvedAlias};
pub use cooccurrence::{ProximityCooccurrence, DEFAULT_WINDOW};
pub use indexer::{IndexedMentions, MentionIndexer};
pub use similarity::{
    normalize_surface_form, JaroWinklerScorer, PartialTokenSortScorer, SimilarityScorer,
};
