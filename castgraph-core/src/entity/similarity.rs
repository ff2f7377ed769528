//! String similarity scorers for alias clustering
//!
//! Two strategies are available:
//! - Jaro-Winkler similarity in [0, 1] (via `strsim`)
//! - Partial token-sort ratio in [0, 100]: tokens are sorted, then the shorter
//!   string is aligned against every window of the longer one, including the
//!   partial windows at both edges, and the best Indel ratio is kept
//!
//! Both score *normalised* surface forms; see [`normalize_surface_form`].

use crate::config::{AliasConfig, AliasStrategy};

/// Pairwise similarity used to pick each surface form's best match
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of two normalised surface forms
    fn score(&self, a: &str, b: &str) -> f64;

    /// Minimum score for a match; a score equal to the threshold matches
    fn threshold(&self) -> f64;

    /// Whether a score reaches the threshold
    fn is_match(&self, score: f64) -> bool {
        score >= self.threshold()
    }

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Lower-case a surface form and replace spaces with `_`
///
/// Multi-word names then compare as single tokens.
pub fn normalize_surface_form(word: &str) -> String {
    word.to_lowercase().replace(' ', "_")
}

/// Jaro-Winkler similarity with a float threshold
#[derive(Debug, Clone, Copy)]
pub struct JaroWinklerScorer {
    threshold: f64,
}

impl JaroWinklerScorer {
    /// Create a scorer with a threshold in [0, 1]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for JaroWinklerScorer {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl SimilarityScorer for JaroWinklerScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Partial token-sort ratio with an integer threshold
#[derive(Debug, Clone, Copy)]
pub struct PartialTokenSortScorer {
    threshold: u8,
}

impl PartialTokenSortScorer {
    /// Create a scorer with a threshold in [0, 100]
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for PartialTokenSortScorer {
    fn default() -> Self {
        Self::new(80)
    }
}

impl SimilarityScorer for PartialTokenSortScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        partial_token_sort_ratio(a, b)
    }

    fn threshold(&self) -> f64 {
        f64::from(self.threshold)
    }

    fn name(&self) -> &'static str {
        "partial_token_sort"
    }
}

/// Build the scorer selected by the alias configuration
pub fn scorer_from_config(config: &AliasConfig) -> Box<dyn SimilarityScorer> {
    match config.strategy {
        AliasStrategy::JaroWinkler => Box::new(JaroWinklerScorer::new(config.jaro_winkler_threshold)),
        AliasStrategy::PartialTokenSort => {
            Box::new(PartialTokenSortScorer::new(config.partial_token_sort_threshold))
        },
    }
}

/// Sort whitespace-separated tokens and re-join them with single spaces
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Partial ratio of the token-sorted strings, in [0, 100]
pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Best Indel ratio of the shorter string against windows of the longer one
///
/// Besides every full-length window, the shorter string is aligned against
/// the partial windows hanging off either edge of the longer one (each
/// proper prefix and suffix shorter than it). Equal-length strings are
/// aligned both ways. Empty against empty scores 100, empty against anything
/// else scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() == b.len() {
        return aligned_ratio(&a, &b).max(aligned_ratio(&b, &a));
    }
    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    aligned_ratio(short, long)
}

fn aligned_ratio(short: &[char], long: &[char]) -> f64 {
    let edges = (1..short.len()).flat_map(|len| [&long[..len], &long[long.len() - len..]]);

    let mut best = 0.0f64;
    for window in long.windows(short.len()).chain(edges) {
        let score = indel_ratio(short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Normalised Indel similarity `200 * LCS / (len_a + len_b)`, in [0, 100]
pub fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    (200 * longest_common_subsequence(a, b)) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
