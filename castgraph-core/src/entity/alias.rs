//! Greedy alias clustering
//!
//! Each surface form is attached to the group of its single best-scoring
//! match, which is not a transitive closure: two forms may end up apart even
//! though a chain of matches links them. The result depends on iteration
//! order, so forms are always processed in first-seen order.

use indexmap::IndexMap;

use crate::config::AliasConfig;
use crate::core::{AliasCluster, Mention};
use crate::entity::similarity::{normalize_surface_form, scorer_from_config, SimilarityScorer};

/// Distinct surface forms of a mention list, in first-seen order
pub fn distinct_surface_forms(mentions: &[Mention]) -> Vec<String> {
    let mut seen: IndexMap<&str, ()> = IndexMap::new();
    for mention in mentions {
        seen.entry(mention.word.as_str()).or_insert(());
    }
    seen.into_keys().map(str::to_string).collect()
}

/// Partitions surface forms into alias clusters
pub struct AliasClusterer {
    scorer: Box<dyn SimilarityScorer>,
}

impl std::fmt::Debug for AliasClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasClusterer")
            .field("scorer", &self.scorer.name())
            .field("threshold", &self.scorer.threshold())
            .finish()
    }
}

impl AliasClusterer {
    /// Create a clusterer around a similarity scorer
    pub fn new(scorer: Box<dyn SimilarityScorer>) -> Self {
        Self { scorer }
    }

    /// Create a clusterer with the configured strategy and threshold
    pub fn from_config(config: &AliasConfig) -> Self {
        Self::new(scorer_from_config(config))
    }

    /// The scorer in use
    pub fn scorer(&self) -> &dyn SimilarityScorer {
        self.scorer.as_ref()
    }

    /// Cluster the surface forms of a mention list
    pub fn cluster_mentions(&self, mentions: &[Mention]) -> Vec<AliasCluster> {
        self.cluster(&distinct_surface_forms(mentions))
    }

    /// Cluster surface forms
    ///
    /// Duplicates are ignored after their first occurrence. For each form not
    /// yet grouped, the best match among all other forms is looked up: the
    /// highest score reaching the threshold, ties going to the form seen
    /// first. Without a match the form opens a new group; otherwise it joins
    /// the match's group, which is opened on the spot if the match is not
    /// grouped yet. Clusters come out in group creation order and list their
    /// members in first-seen order, with their original casing.
    pub fn cluster<S: AsRef<str>>(&self, forms: &[S]) -> Vec<AliasCluster> {
        let mut unique: IndexMap<&str, String> = IndexMap::new();
        for form in forms {
            let form = form.as_ref();
            unique
                .entry(form)
                .or_insert_with(|| normalize_surface_form(form));
        }
        let normalized: Vec<&str> = unique.values().map(String::as_str).collect();

        let mut group_of: Vec<Option<usize>> = vec![None; normalized.len()];
        let mut next_group_id = 0usize;

        for index in 0..normalized.len() {
            if group_of[index].is_some() {
                continue;
            }

            let group = match self.best_match(index, &normalized) {
                None => None,
                Some(matched) => match group_of[matched] {
                    Some(group) => Some(group),
                    None => {
                        group_of[matched] = Some(next_group_id);
                        next_group_id += 1;
                        Some(next_group_id - 1)
                    },
                },
            };

            group_of[index] = Some(group.unwrap_or_else(|| {
                next_group_id += 1;
                next_group_id - 1
            }));
        }

        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); next_group_id];
        for (form, group) in unique.keys().zip(group_of) {
            if let Some(group) = group {
                buckets[group].push((*form).to_string());
            }
        }

        let clusters: Vec<AliasCluster> = buckets
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(AliasCluster::new)
            .collect();

        tracing::debug!(
            scorer = self.scorer.name(),
            threshold = self.scorer.threshold(),
            forms = normalized.len(),
            clusters = clusters.len(),
            "alias clustering complete"
        );
        clusters
    }

    fn best_match(&self, index: usize, normalized: &[&str]) -> Option<usize> {
        let name = normalized[index];
        let mut best: Option<(usize, f64)> = None;

        for (other, candidate) in normalized.iter().enumerate() {
            if other == index {
                continue;
            }
            let score = self.scorer.score(name, candidate);
            if !self.scorer.is_match(score) {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((other, score));
            }
        }

        best.map(|(other, _)| other)
    }
}

impl Default for AliasClusterer {
    fn default() -> Self {
        Self::from_config(&AliasConfig::default())
    }
}
