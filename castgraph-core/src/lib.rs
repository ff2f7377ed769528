//! # castgraph core
//!
//! Character co-occurrence graphs from novel chapters.
//!
//! A chapter goes through four stages:
//! - mentions found by a tagger in each chunk are rebased onto the chapter
//!   text ([`MentionIndexer`])
//! - mentions close enough together become raw interactions
//!   ([`ProximityCooccurrence`])
//! - surface forms are grouped into alias clusters ([`AliasClusterer`], or a
//!   language model through [`llm`])
//! - raw interactions are rewritten as cluster pairs
//!   ([`CooccurrenceAliasMapper`]) and fed to a [`CharacterGraph`]
//!
//! ## Feature Flags
//!
//! - `toml-support` (default): TOML configuration files
//! - `yaml-support`: YAML configuration files
//! - `parallel`: process batches of chapters on the rayon thread pool
//! - `ureq`: Ollama HTTP client for LLM alias clustering
//!
//! ## Quick Start
//!
//! ```rust
//! use castgraph_core::{ChapterPipeline, Config};
//!
//! # fn example() -> castgraph_core::Result<()> {
//! let pipeline = ChapterPipeline::new(Config::default())?;
//! let report = pipeline.run_tagged("<PER> Hari </PER> salua <PER> Dors </PER> .")?;
//! assert_eq!(report.graph.edge_count(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration management and loading
pub mod config;
/// Core types and errors
pub mod core;
/// Mention indexing, co-occurrence and alias resolution
pub mod entity;
/// NER evaluation
pub mod evaluation;
/// Character graph and its serialisations
pub mod graph;
/// Language-model alias clustering
pub mod llm;
/// Named-entity recognition collaborators
pub mod ner;
/// Per-chapter orchestration
pub mod pipeline;
/// Text normalisation, chunking and tokenisation
pub mod text;

/// Prelude module containing the most commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::core::{
        AliasCluster, CastGraphError, ChapterId, Chunk, Mention, RawInteraction,
        ResolvedInteraction, Result,
    };
    pub use crate::pipeline::{ChapterInput, ChapterPipeline, ChapterReport};
}

pub use crate::config::Config;
pub use crate::core::{
    AliasCluster, CastGraphError, ChapterId, Chunk, ErrorContext, ErrorSeverity, Mention,
    RawInteraction, ResolvedInteraction, Result,
};
pub use crate::entity::{
    AliasClusterer, CooccurrenceAliasMapper, IndexedMentions, MappingOutcome, MentionIndexer,
    ProximityCooccurrence, SimilarityScorer, UnresolvedAlias,
};
pub use crate::graph::CharacterGraph;
pub use crate::ner::MentionExtractor;
pub use crate::pipeline::{
    BatchRunner, ChapterInput, ChapterJob, ChapterPipeline, ChapterReport, ClusteringSource,
};
