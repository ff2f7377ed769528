use crate::core::{PERSON_GROUP, PERSON_GROUP_LONG};

/// Configuration file loading utilities
pub mod loader;
/// Configuration validation utilities
pub mod validation;

pub use loader::{load_config, save_config, ConfigFormat};
pub use validation::{Validatable, ValidationResult};

/// Configuration for a castgraph run
///
/// Every section falls back to its defaults when missing from a config file,
/// so an empty file yields `Config::default()`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text normalisation and chunking ahead of NER
    pub chunking: ChunkingConfig,

    /// Filtering of NER collaborator output
    pub ner: NerConfig,

    /// Proximity window for raw interactions
    pub proximity: ProximityConfig,

    /// Alias clustering strategy and thresholds
    pub alias: AliasConfig,

    /// Optional LLM alias clustering
    pub llm: LlmConfig,

    /// Graph sink settings
    pub graph: GraphConfig,

    /// Output locations
    pub output: OutputConfig,
}

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of words per chunk handed to the tagger
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_words: 500 }
    }
}

/// NER output filtering
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Entity groups treated as persons
    pub person_groups: Vec<String>,

    /// Mentions with this many characters or fewer are discarded
    pub min_mention_chars: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            person_groups: vec![PERSON_GROUP.to_string(), PERSON_GROUP_LONG.to_string()],
            min_mention_chars: 1,
        }
    }
}

/// Proximity co-occurrence configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Maximum number of tokens between two mentions (inclusive)
    pub window: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self { window: 25 }
    }
}

/// Similarity strategy used by the deterministic alias clusterer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasStrategy {
    /// Jaro-Winkler similarity in [0, 1]
    JaroWinkler,
    /// Partial token-sort ratio in [0, 100]
    #[default]
    PartialTokenSort,
}

impl std::str::FromStr for AliasStrategy {
    type Err = crate::CastGraphError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "jaro_winkler" | "jaro" => Ok(AliasStrategy::JaroWinkler),
            "partial_token_sort" | "fuzzy" => Ok(AliasStrategy::PartialTokenSort),
            other => Err(crate::config_error!("unknown alias strategy '{}'", other)),
        }
    }
}

/// Alias clustering configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Which similarity strategy to use
    pub strategy: AliasStrategy,

    /// Minimum Jaro-Winkler score for two forms to match (0.0-1.0)
    pub jaro_winkler_threshold: f64,

    /// Minimum partial token-sort ratio for two forms to match (0-100)
    pub partial_token_sort_threshold: u8,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            strategy: AliasStrategy::PartialTokenSort,
            jaro_winkler_threshold: 0.8,
            partial_token_sort_threshold: 80,
        }
    }
}

/// LLM alias clustering configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ask a language model to group surface forms
    pub enabled: bool,

    /// Use the deterministic clusterer when the model call or parsing fails
    pub fallback_to_fuzzy: bool,

    /// Surface forms removed before prompting (tagger false positives)
    pub excluded_forms: Vec<String>,

    /// Ollama endpoint settings
    pub ollama: crate::llm::OllamaConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fallback_to_fuzzy: true,
            excluded_forms: Vec::new(),
            ollama: crate::llm::OllamaConfig::default(),
        }
    }
}

/// Orientation of resolved interactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOrder {
    /// Keep the order of the raw interaction
    #[default]
    Preserve,
    /// Order both sides by cluster index
    Canonical,
}

/// Graph sink configuration
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Count repeated interactions as edge weight
    pub weighted: bool,

    /// Orientation of reported resolved interactions
    pub pair_order: PairOrder,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the CSV submission manifest
    pub submission_path: String,

    /// Directory for per-chapter GraphML files (none when empty)
    pub graphml_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            submission_path: "submission.csv".to_string(),
            graphml_dir: String::new(),
        }
    }
}

impl Config {
    /// Loads a configuration file, picking the format from its extension
    pub fn from_file(path: &str) -> crate::Result<Self> {
        load_config(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        assert_eq!(config.chunking.max_words, 500);
        assert_eq!(config.proximity.window, 25);
        assert_eq!(config.alias.strategy, AliasStrategy::PartialTokenSort);
        assert_eq!(config.alias.partial_token_sort_threshold, 80);
        assert!((config.alias.jaro_winkler_threshold - 0.8).abs() < f64::EPSILON);
        assert!(!config.graph.weighted);
        assert_eq!(config.graph.pair_order, PairOrder::Preserve);
        assert!(!config.llm.enabled);
        assert!(config.llm.fallback_to_fuzzy);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "jaro-winkler".parse::<AliasStrategy>().unwrap(),
            AliasStrategy::JaroWinkler
        );
        assert_eq!(
            "fuzzy".parse::<AliasStrategy>().unwrap(),
            AliasStrategy::PartialTokenSort
        );
        assert!("soundex".parse::<AliasStrategy>().is_err());
    }

    #[test]
    fn test_partial_json_uses_section_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"proximity":{"window":10},"graph":{"weighted":true}}"#)
                .unwrap();
        assert_eq!(config.proximity.window, 10);
        assert!(config.graph.weighted);
        assert_eq!(config.chunking, ChunkingConfig::default());
    }
}
