//! Character interaction graph
//!
//! Nodes are alias clusters keyed by their first member, edges are resolved
//! interactions. Nodes only enter the graph through an edge, so characters
//! without any interaction are absent.

use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::core::{AliasCluster, ResolvedInteraction};
use crate::{CastGraphError, Result};

/// GraphML serialisation
pub mod graphml;
/// CSV submission manifest
pub mod submission;

pub use graphml::to_graphml;
pub use submission::{read_submission, SubmissionRow, SubmissionWriter};

/// A character node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterNode {
    /// First surface form of the cluster
    pub key: String,
    /// All surface forms joined with `;`
    pub names: String,
}

/// Undirected co-occurrence graph of one chapter
#[derive(Debug, Clone)]
pub struct CharacterGraph {
    graph: UnGraph<CharacterNode, u32>,
    node_index: IndexMap<String, NodeIndex>,
    weighted: bool,
}

impl CharacterGraph {
    /// Create an empty graph
    ///
    /// A weighted graph counts repeated interactions on the edge; an
    /// unweighted one keeps a single edge of weight 1 per pair.
    pub fn new(weighted: bool) -> Self {
        Self {
            graph: UnGraph::default(),
            node_index: IndexMap::new(),
            weighted,
        }
    }

    /// Build a graph from resolved interactions
    pub fn from_resolved(
        resolved: &[ResolvedInteraction],
        clusters: &[AliasCluster],
        weighted: bool,
    ) -> Result<Self> {
        let mut graph = Self::new(weighted);
        for interaction in resolved {
            let (left, right) = interaction.clusters(clusters).ok_or_else(|| {
                CastGraphError::GraphConstruction {
                    message: format!(
                        "interaction {}-{} refers to a missing cluster ({} clusters)",
                        interaction.left,
                        interaction.right,
                        clusters.len()
                    ),
                }
            })?;
            graph.add_interaction(left.members(), right.members())?;
        }
        Ok(graph)
    }

    /// Whether repeated interactions increase edge weight
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Record one interaction between two clusters given by their members
    pub fn add_interaction(&mut self, left: &[String], right: &[String]) -> Result<()> {
        let left = self.upsert_node(left)?;
        let right = self.upsert_node(right)?;

        if left == right {
            tracing::debug!(key = %self.graph[left].key, "ignoring self interaction");
            return Ok(());
        }

        match self.graph.find_edge(left, right) {
            Some(edge) if self.weighted => self.graph[edge] += 1,
            Some(_) => {},
            None => {
                self.graph.add_edge(left, right, 1);
            },
        }
        Ok(())
    }

    fn upsert_node(&mut self, members: &[String]) -> Result<NodeIndex> {
        let key = members
            .first()
            .ok_or_else(|| CastGraphError::GraphConstruction {
                message: "cannot add a character without surface forms".to_string(),
            })?;
        let names = members.join(";");

        if let Some(&index) = self.node_index.get(key) {
            self.graph[index].names = names;
            return Ok(index);
        }

        let index = self.graph.add_node(CharacterNode {
            key: key.clone(),
            names,
        });
        self.node_index.insert(key.clone(), index);
        Ok(index)
    }

    /// Number of characters
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct interacting pairs
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node by key
    pub fn node(&self, key: &str) -> Option<&CharacterNode> {
        self.node_index.get(key).map(|&index| &self.graph[index])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &CharacterNode> + '_ {
        self.node_index.values().map(move |&index| &self.graph[index])
    }

    /// Edges as `(key, key, weight)` in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u32)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].key.as_str(),
                self.graph[edge.target()].key.as_str(),
                *edge.weight(),
            )
        })
    }

    /// Weight of the edge between two keys, in either order
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let edge = self.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    fn find_edge(&self, a: &str, b: &str) -> Option<EdgeIndex> {
        let a = *self.node_index.get(a)?;
        let b = *self.node_index.get(b)?;
        self.graph.find_edge(a, b)
    }

    /// Serialise as GraphML
    pub fn to_graphml(&self) -> String {
        graphml::to_graphml(self)
    }
}

impl Default for CharacterGraph {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_weighted_graph_counts_repeats() {
        let alice = members(&["A", "Alice"]);
        let bob = members(&["B", "Bob"]);
        let mut graph = CharacterGraph::new(true);
        graph.add_interaction(&alice, &bob).unwrap();
        graph.add_interaction(&bob, &alice).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("A", "B"), Some(2));
        assert_eq!(graph.node("A").unwrap().names, "A;Alice");
    }

    #[test]
    fn test_unweighted_graph_keeps_single_edge() {
        let mut graph = CharacterGraph::default();
        for _ in 0..3 {
            graph
                .add_interaction(&members(&["Hari"]), &members(&["Dors"]))
                .unwrap();
        }
        assert_eq!(graph.edge_weight("Dors", "Hari"), Some(1));
        assert!(!graph.is_weighted());
    }

    #[test]
    fn test_from_resolved() {
        let clusters = vec![
            AliasCluster::new(members(&["A", "Alice"])),
            AliasCluster::new(members(&["B", "Bob"])),
            AliasCluster::new(members(&["Carol"])),
        ];
        let resolved = vec![
            ResolvedInteraction { left: 0, right: 1 },
            ResolvedInteraction { left: 0, right: 1 },
        ];
        let graph = CharacterGraph::from_resolved(&resolved, &clusters, true).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("Carol").is_none());
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![("A", "B", 2)]);
    }

    #[test]
    fn test_invalid_input_is_a_graph_error() {
        let mut graph = CharacterGraph::default();
        assert!(matches!(
            graph.add_interaction(&[], &members(&["Hari"])),
            Err(CastGraphError::GraphConstruction { .. })
        ));

        let resolved = vec![ResolvedInteraction { left: 0, right: 4 }];
        assert!(CharacterGraph::from_resolved(&resolved, &[], false).is_err());
    }

    #[test]
    fn test_self_interaction_is_ignored() {
        let mut graph = CharacterGraph::default();
        let hari = members(&["Hari"]);
        graph.add_interaction(&hari, &hari).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
