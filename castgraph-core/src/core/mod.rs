//! Core data structures for castgraph
//!
//! This module contains the fundamental types that flow through the chapter
//! pipeline: mentions and chunks on the way in, interactions and alias
//! clusters on the way out.

pub mod error;

pub use error::{CastGraphError, ErrorContext, ErrorSeverity, Result};

use serde::{Deserialize, Serialize};

/// Entity group emitted by the NER collaborator for persons
pub const PERSON_GROUP: &str = "PER";

/// Long-form spelling of the person group used by some taggers
pub const PERSON_GROUP_LONG: &str = "PERSON";

/// A detected span of text believed to name a person
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    /// Surface form, exactly as it appears in the text
    pub word: String,
    /// Starting character offset (chunk-local until indexed, global after)
    pub start: usize,
    /// Ending character offset, exclusive
    pub end: usize,
    /// Entity group tag reported by the tagger
    #[serde(default = "default_entity_group")]
    pub entity_group: String,
}

fn default_entity_group() -> String {
    PERSON_GROUP.to_string()
}

impl Mention {
    /// Creates a person mention
    pub fn new(word: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            entity_group: default_entity_group(),
        }
    }

    /// Creates a mention with an explicit entity group
    pub fn with_group(
        word: impl Into<String>,
        start: usize,
        end: usize,
        entity_group: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            entity_group: entity_group.into(),
        }
    }

    /// Number of characters in the surface form
    pub fn char_len(&self) -> usize {
        self.word.chars().count()
    }

    /// Shifts both offsets by `delta` characters, saturating at `usize::MAX`
    pub fn shift(&mut self, delta: usize) {
        self.start = self.start.saturating_add(delta);
        self.end = self.end.saturating_add(delta);
    }
}

/// A piece of chapter text together with the mentions found in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Raw chunk text
    pub text: String,
    /// Mentions with offsets local to `text`
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl Chunk {
    /// Creates a chunk
    pub fn new(text: impl Into<String>, mentions: Vec<Mention>) -> Self {
        Self {
            text: text.into(),
            mentions,
        }
    }

    /// Length of the chunk text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Co-occurrence between two surface forms found close together in the text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawInteraction {
    /// Surface form of the mention that comes first in the mention list
    pub left: String,
    /// Surface form of the mention that comes second
    pub right: String,
}

impl RawInteraction {
    /// Creates a raw interaction
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for RawInteraction {
    fn from((left, right): (A, B)) -> Self {
        Self::new(left, right)
    }
}

/// A set of surface forms judged to refer to one character
///
/// Members keep their original casing and first-seen order; the first member
/// is the canonical representative used as graph node key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasCluster {
    members: Vec<String>,
}

impl AliasCluster {
    /// Creates a cluster from its members
    pub fn new(members: Vec<String>) -> Self {
        Self { members }
    }

    /// All surface forms of the cluster
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// The representative surface form (first member)
    pub fn canonical(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    /// Number of surface forms in the cluster
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Exact membership test
    pub fn contains(&self, word: &str) -> bool {
        self.members.iter().any(|m| m == word)
    }

    /// Case-insensitive membership test
    pub fn contains_ignore_case(&self, word: &str) -> bool {
        let needle = word.to_lowercase();
        self.members.iter().any(|m| m.to_lowercase() == needle)
    }

    /// Members joined with `;`, the value of the `names` node attribute
    pub fn names_attribute(&self) -> String {
        self.members.join(";")
    }
}

impl<S: Into<String>> FromIterator<S> for AliasCluster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Interaction rewritten in terms of alias clusters: one graph edge occurrence
///
/// Both sides are indices into the cluster list the interaction was resolved
/// against. They are never equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedInteraction {
    /// Cluster of the left surface form
    pub left: usize,
    /// Cluster of the right surface form
    pub right: usize,
}

impl ResolvedInteraction {
    /// Looks up both clusters
    ///
    /// Returns `None` when an index is out of range for `clusters`.
    pub fn clusters<'a>(
        &self,
        clusters: &'a [AliasCluster],
    ) -> Option<(&'a AliasCluster, &'a AliasCluster)> {
        Some((clusters.get(self.left)?, clusters.get(self.right)?))
    }

    /// Same interaction with sides ordered by cluster index
    pub fn canonical(self) -> Self {
        if self.left <= self.right {
            self
        } else {
            Self {
                left: self.right,
                right: self.left,
            }
        }
    }
}

/// Identifier of a chapter in a submission manifest: `{book_code}{index}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(pub String);

impl ChapterId {
    /// Builds the id of a chapter numbered from 1 in its book
    ///
    /// Manifest indices start at 0, so chapter 1 of `paf` is `paf0`.
    pub fn from_chapter_number(book_code: &str, chapter_number: usize) -> Self {
        Self(format!("{book_code}{}", chapter_number.saturating_sub(1)))
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChapterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_defaults_to_person_group() {
        let json = r#"{"word":"Hari","start":3,"end":7}"#;
        let mention: Mention = serde_json::from_str(json).unwrap();
        assert_eq!(mention.entity_group, PERSON_GROUP);
        assert_eq!(mention.char_len(), 4);
    }

    #[test]
    fn test_cluster_lookup_ignores_case() {
        let cluster: AliasCluster = ["Hari Seldon", "Seldon"].into_iter().collect();
        assert!(cluster.contains_ignore_case("SELDON"));
        assert!(!cluster.contains("seldon"));
        assert_eq!(cluster.canonical(), Some("Hari Seldon"));
        assert_eq!(cluster.names_attribute(), "Hari Seldon;Seldon");
    }

    #[test]
    fn test_chapter_id_is_zero_based() {
        assert_eq!(ChapterId::from_chapter_number("paf", 1).to_string(), "paf0");
        assert_eq!(ChapterId::from_chapter_number("lca", 18).to_string(), "lca17");
    }

    #[test]
    fn test_resolved_interaction_canonical_order() {
        let pair = ResolvedInteraction { left: 3, right: 1 };
        assert_eq!(pair.canonical(), ResolvedInteraction { left: 1, right: 3 });
        assert!(pair.clusters(&[]).is_none());
    }
}
