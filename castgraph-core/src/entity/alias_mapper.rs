use std::collections::HashMap;

use crate::config::PairOrder;
use crate::core::{AliasCluster, RawInteraction, ResolvedInteraction};

/// Side of a raw interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSide {
    /// First surface form of the pair
    Left,
    /// Second surface form of the pair
    Right,
}

/// A surface form that matched no cluster
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnresolvedAlias {
    /// The surface form as it appeared in the raw interaction
    pub word: String,
    /// Which side of the interaction it was on
    pub side: InteractionSide,
}

/// Result of mapping raw interactions onto clusters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    /// Cluster pairs, one per surviving raw interaction
    pub resolved: Vec<ResolvedInteraction>,
    /// Lookup misses, in encounter order
    pub unresolved: Vec<UnresolvedAlias>,
    /// Interactions dropped because both sides share a cluster
    pub self_pairs: usize,
}

impl MappingOutcome {
    /// Cluster member lists of each resolved interaction, as handed to a graph sink
    pub fn member_pairs<'a>(
        &self,
        clusters: &'a [AliasCluster],
    ) -> Vec<(&'a [String], &'a [String])> {
        self.resolved
            .iter()
            .filter_map(|pair| pair.clusters(clusters))
            .map(|(left, right)| (left.members(), right.members()))
            .collect()
    }
}

/// Rewrites raw surface-form interactions as cluster interactions
///
/// Surface forms are looked up case-insensitively. When a form appears in
/// several clusters the first cluster in list order wins. A pair with a side
/// that matches no cluster is dropped and reported, and a pair whose sides
/// fall in the same cluster is dropped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooccurrenceAliasMapper {
    pair_order: PairOrder,
}

impl CooccurrenceAliasMapper {
    /// Create a mapper with the given pair orientation
    pub fn new(pair_order: PairOrder) -> Self {
        Self { pair_order }
    }

    /// Map raw interactions onto clusters
    pub fn map(&self, raw: &[RawInteraction], clusters: &[AliasCluster]) -> MappingOutcome {
        let lookup = ClusterLookup::new(clusters);
        let mut outcome = MappingOutcome::default();

        for interaction in raw {
            let left = lookup.find(&interaction.left);
            let right = lookup.find(&interaction.right);

            if left.is_none() {
                outcome.unresolved.push(UnresolvedAlias {
                    word: interaction.left.clone(),
                    side: InteractionSide::Left,
                });
            }
            if right.is_none() {
                outcome.unresolved.push(UnresolvedAlias {
                    word: interaction.right.clone(),
                    side: InteractionSide::Right,
                });
            }

            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };
            if left == right {
                outcome.self_pairs += 1;
                continue;
            }

            let resolved = ResolvedInteraction { left, right };
            outcome.resolved.push(match self.pair_order {
                PairOrder::Preserve => resolved,
                PairOrder::Canonical => resolved.canonical(),
            });
        }

        for miss in &outcome.unresolved {
            tracing::debug!(word = %miss.word, side = ?miss.side, "surface form without alias cluster");
        }
        tracing::debug!(
            raw = raw.len(),
            resolved = outcome.resolved.len(),
            self_pairs = outcome.self_pairs,
            "alias mapping complete"
        );
        outcome
    }
}

/// Lower-cased member to index of the first cluster containing it
struct ClusterLookup {
    index: HashMap<String, usize>,
}

impl ClusterLookup {
    fn new(clusters: &[AliasCluster]) -> Self {
        let mut index = HashMap::new();
        for (position, cluster) in clusters.iter().enumerate() {
            for member in cluster.members() {
                let first = *index.entry(member.to_lowercase()).or_insert(position);
                if first != position {
                    tracing::debug!(form = %member, first, ignored = position, "ambiguous surface form");
                }
            }
        }
        Self { index }
    }

    fn find(&self, word: &str) -> Option<usize> {
        self.index.get(&word.to_lowercase()).copied()
    }
}
