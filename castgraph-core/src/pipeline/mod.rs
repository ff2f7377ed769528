//! Chapter pipeline
//!
//! Wires the stages together for one chapter:
//!
//! ```text
//! chunks ─▶ MentionIndexer ─▶ ProximityCooccurrence ─▶ raw interactions ─┐
//!              │                                                         ├─▶ CooccurrenceAliasMapper ─▶ CharacterGraph
//!              └──▶ distinct surface forms ─▶ AliasClusterer / LLM ─────┘
//! ```
//!
//! Chapters are independent, so a batch can be processed one chapter per
//! worker with [`BatchRunner`].

use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, Validatable};
use crate::core::{AliasCluster, Chunk, ChapterId, Mention, RawInteraction, ResolvedInteraction};
use crate::entity::{
    distinct_surface_forms, AliasClusterer, CooccurrenceAliasMapper, MentionIndexer,
    ProximityCooccurrence, UnresolvedAlias,
};
use crate::graph::CharacterGraph;
use crate::llm::{CompletionClient, LlmAliasClusterer, OllamaClient};
use crate::ner::{
    extract_chunks, parse_tagged_text, render_tagged_text, MentionExtractor, MentionFilter,
    NerDocument,
};
use crate::text::{normalize_whitespace, WordChunker};
use crate::{config_error, Result};

/// Which clusterer produced a chapter's clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringSource {
    /// String-similarity clustering
    Deterministic,
    /// Language-model clustering
    Llm,
}

/// Input of one chapter run
#[derive(Debug, Clone)]
pub enum ChapterInput {
    /// Chunks already tagged by an external NER pass, filtered before use
    Chunks(Vec<Chunk>),
    /// Raw text, tagged with the pipeline's extractor
    Text(String),
    /// Text annotated with `<PER> … </PER>` tags
    Tagged(String),
}

impl ChapterInput {
    /// Read a raw text file
    pub fn text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::Text(std::fs::read_to_string(path)?))
    }

    /// Read a JSON dump of tagger output
    pub fn ner_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::Chunks(NerDocument::from_json_file(path)?.chunks))
    }

    /// Read a `<PER>`-tagged text file
    pub fn tagged_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::Tagged(std::fs::read_to_string(path)?))
    }
}

/// Everything a chapter run produced
#[derive(Debug, Clone)]
pub struct ChapterReport {
    /// Canonical chapter text
    pub text: String,
    /// Mentions with global offsets
    pub mentions: Vec<Mention>,
    /// Surface-form pairs found close together
    pub raw_interactions: Vec<RawInteraction>,
    /// Alias clusters
    pub clusters: Vec<AliasCluster>,
    /// Cluster pairs, indices into `clusters`
    pub resolved: Vec<ResolvedInteraction>,
    /// Surface forms that matched no cluster
    pub unresolved: Vec<UnresolvedAlias>,
    /// The chapter graph
    pub graph: CharacterGraph,
    /// Which clusterer produced `clusters`
    pub clustering_source: ClusteringSource,
}

impl ChapterReport {
    /// Resolved interactions as pairs of cluster member lists
    pub fn member_pairs(&self) -> Vec<(&[String], &[String])> {
        self.resolved
            .iter()
            .filter_map(|pair| pair.clusters(&self.clusters))
            .map(|(left, right)| (left.members(), right.members()))
            .collect()
    }

    /// Chapter text with its mentions written back as `<PER> … </PER>` tags
    pub fn tagged_text(&self) -> String {
        render_tagged_text(&self.text, &self.mentions)
    }
}

/// Per-chapter orchestration of indexing, co-occurrence, clustering and mapping
pub struct ChapterPipeline {
    config: Config,
    chunker: WordChunker,
    filter: MentionFilter,
    indexer: MentionIndexer,
    proximity: ProximityCooccurrence,
    clusterer: AliasClusterer,
    mapper: CooccurrenceAliasMapper,
    extractor: Option<Arc<dyn MentionExtractor>>,
    llm: Option<LlmAliasClusterer>,
}

impl std::fmt::Debug for ChapterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChapterPipeline")
            .field("proximity", &self.proximity)
            .field("clusterer", &self.clusterer)
            .field("extractor", &self.extractor.as_ref().map(|e| e.name().to_string()))
            .field("llm", &self.llm)
            .finish()
    }
}

impl ChapterPipeline {
    /// Build a pipeline from a validated configuration
    ///
    /// When `llm.enabled` is set an Ollama client is created from
    /// `llm.ollama`; [`ChapterPipeline::with_completion_client`] replaces it.
    pub fn new(config: Config) -> Result<Self> {
        config.validate().into_result()?;

        let llm = config.llm.enabled.then(|| {
            LlmAliasClusterer::new(
                Arc::new(OllamaClient::new(config.llm.ollama.clone())),
                config.llm.excluded_forms.clone(),
            )
        });

        Ok(Self {
            chunker: WordChunker::new(config.chunking.max_words)?,
            filter: MentionFilter::from(&config.ner),
            indexer: MentionIndexer::new(),
            proximity: ProximityCooccurrence::new(config.proximity.window),
            clusterer: AliasClusterer::from_config(&config.alias),
            mapper: CooccurrenceAliasMapper::new(config.graph.pair_order),
            extractor: None,
            llm,
            config,
        })
    }

    /// Use `extractor` for [`ChapterInput::Text`] inputs
    pub fn with_extractor(mut self, extractor: Arc<dyn MentionExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Cluster aliases with a completion model, falling back per configuration
    pub fn with_completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.llm = Some(LlmAliasClusterer::new(
            client,
            self.config.llm.excluded_forms.clone(),
        ));
        self
    }

    /// Replace the deterministic clusterer
    pub fn with_clusterer(mut self, clusterer: AliasClusterer) -> Self {
        self.clusterer = clusterer;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one chapter
    pub fn run(&self, input: ChapterInput) -> Result<ChapterReport> {
        match input {
            ChapterInput::Chunks(chunks) => {
                self.run_chunks(NerDocument { chunks }.filtered(&self.filter))
            },
            ChapterInput::Text(text) => self.run_text(&text),
            ChapterInput::Tagged(tagged) => self.run_tagged(&tagged),
        }
    }

    /// Run on raw text with the configured extractor
    pub fn run_text(&self, text: &str) -> Result<ChapterReport> {
        let extractor = self
            .extractor
            .as_deref()
            .ok_or_else(|| config_error!("no mention extractor configured for raw text input"))?;
        let text = normalize_whitespace(text);
        let chunks = extract_chunks(&text, &self.chunker, extractor, &self.filter)?;
        self.run_chunks(chunks)
    }

    /// Run on `<PER>`-tagged text, taking the tags as mentions
    pub fn run_tagged(&self, tagged: &str) -> Result<ChapterReport> {
        let mut chunk = parse_tagged_text(tagged).into_chunk();
        chunk.mentions = self.filter.apply(chunk.mentions);
        self.run_chunks(vec![chunk])
    }

    /// Run on chunks carrying chunk-local mentions
    pub fn run_chunks(&self, chunks: Vec<Chunk>) -> Result<ChapterReport> {
        let chunk_count = chunks.len();
        let indexed = self.indexer.index(chunks);
        let raw_interactions = self.proximity.interactions(&indexed.text, &indexed.mentions);

        let forms = distinct_surface_forms(&indexed.mentions);
        let (clusters, clustering_source) = self.cluster_forms(&forms)?;

        let outcome = self.mapper.map(&raw_interactions, &clusters);
        let graph =
            CharacterGraph::from_resolved(&outcome.resolved, &clusters, self.config.graph.weighted)?;

        tracing::info!(
            chunks = chunk_count,
            mentions = indexed.mentions.len(),
            raw = raw_interactions.len(),
            clusters = clusters.len(),
            resolved = outcome.resolved.len(),
            unresolved = outcome.unresolved.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            source = ?clustering_source,
            "chapter processed"
        );

        Ok(ChapterReport {
            text: indexed.text,
            mentions: indexed.mentions,
            raw_interactions,
            clusters,
            resolved: outcome.resolved,
            unresolved: outcome.unresolved,
            graph,
            clustering_source,
        })
    }

    fn cluster_forms(&self, forms: &[String]) -> Result<(Vec<AliasCluster>, ClusteringSource)> {
        if let Some(llm) = self.llm.as_ref().filter(|_| !forms.is_empty()) {
            match llm.cluster(forms) {
                Ok(clusters) => return Ok((clusters, ClusteringSource::Llm)),
                Err(e) if self.config.llm.fallback_to_fuzzy && e.is_recoverable() => {
                    tracing::warn!(
                        error = %e,
                        category = e.category(),
                        "LLM alias clustering failed, using string similarity"
                    );
                },
                Err(e) => return Err(e),
            }
        }
        Ok((self.clusterer.cluster(forms), ClusteringSource::Deterministic))
    }
}

/// One chapter of a batch
#[derive(Debug, Clone)]
pub struct ChapterJob {
    /// Manifest identifier
    pub id: ChapterId,
    /// Chapter input
    pub input: ChapterInput,
}

/// Runs many chapters through one pipeline
///
/// Failures are reported per chapter; one bad chapter never aborts the batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner<'p> {
    pipeline: &'p ChapterPipeline,
}

impl<'p> BatchRunner<'p> {
    /// Create a runner over a pipeline
    pub fn new(pipeline: &'p ChapterPipeline) -> Self {
        Self { pipeline }
    }

    /// Process chapters one after the other, in job order
    pub fn run(&self, jobs: Vec<ChapterJob>) -> Vec<(ChapterId, Result<ChapterReport>)> {
        jobs.into_iter().map(|job| self.run_job(job)).collect()
    }

    /// Process chapters on the rayon thread pool; results keep job order
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self, jobs: Vec<ChapterJob>) -> Vec<(ChapterId, Result<ChapterReport>)> {
        use rayon::prelude::*;

        jobs.into_par_iter().map(|job| self.run_job(job)).collect()
    }

    fn run_job(&self, job: ChapterJob) -> (ChapterId, Result<ChapterReport>) {
        let span = tracing::info_span!("chapter", id = %job.id);
        let _guard = span.enter();
        let result = self.pipeline.run(job.input);
        if let Err(e) = &result {
            tracing::error!(error = %e, category = e.category(), "chapter failed");
        }
        (job.id, result)
    }
}
