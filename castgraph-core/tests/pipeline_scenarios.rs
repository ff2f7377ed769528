//! End-to-end chapter scenarios

mod common;

use castgraph_core::entity::{AliasClusterer, CooccurrenceAliasMapper, SimilarityScorer};
use castgraph_core::graph::{read_submission, SubmissionWriter};
use castgraph_core::{
    AliasCluster, BatchRunner, ChapterId, ChapterInput, ChapterJob, ChapterPipeline, CharacterGraph,
    ClusteringSource, Config, RawInteraction,
};
use common::*;

fn members(cluster: &AliasCluster) -> Vec<&str> {
    cluster.members().iter().map(String::as_str).collect()
}

#[test]
fn seldon_aliases_collapse_into_one_character() {
    let clusters = AliasClusterer::default().cluster(&["Seldon", "Hari Seldon", "Hari"]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(members(&clusters[0]), vec!["Seldon", "Hari Seldon", "Hari"]);

    let raw = vec![RawInteraction::new("Seldon", "Hari")];
    let outcome = CooccurrenceAliasMapper::default().map(&raw, &clusters);
    assert!(outcome.resolved.is_empty());

    let pipeline = ChapterPipeline::new(Config::default()).unwrap();
    let report = pipeline
        .run_chunks(vec![spaced_chunk(&["Seldon", "Hari Seldon", "Hari"], &[3, 3])])
        .unwrap();
    assert_eq!(report.raw_interactions.len(), 3);
    assert!(report.resolved.is_empty());
    assert_eq!(report.graph.edge_count(), 0);
}

#[test]
fn proximity_window_decides_interactions() {
    let pipeline = ChapterPipeline::new(Config::default()).unwrap();

    let near = pipeline
        .run_chunks(vec![spaced_chunk(&["Cléon", "Demerzel"], &[10])])
        .unwrap();
    assert_eq!(near.raw_interactions, vec![RawInteraction::new("Cléon", "Demerzel")]);
    assert_eq!(near.graph.edge_count(), 1);

    let far = pipeline
        .run_chunks(vec![spaced_chunk(&["Cléon", "Demerzel"], &[30])])
        .unwrap();
    assert!(far.raw_interactions.is_empty());
    assert_eq!(far.graph.node_count(), 0);
}

#[test]
fn multiplicity_becomes_edge_weight() {
    let clusters = vec![
        AliasCluster::new(vec!["A".into(), "Alice".into()]),
        AliasCluster::new(vec!["B".into(), "Bob".into()]),
    ];
    let raw = vec![RawInteraction::new("Alice", "Bob"), RawInteraction::new("A", "B")];

    let outcome = CooccurrenceAliasMapper::default().map(&raw, &clusters);
    let pairs = outcome.member_pairs(&clusters);
    assert_eq!(pairs.len(), 2);
    for (left, right) in &pairs {
        assert_eq!(*left, clusters[0].members());
        assert_eq!(*right, clusters[1].members());
    }

    let graph = CharacterGraph::from_resolved(&outcome.resolved, &clusters, true).unwrap();
    assert_eq!(graph.edge_weight("A", "B"), Some(2));
    assert_eq!(graph.node("B").unwrap().names, "B;Bob");
}

struct ExactScorer;

impl SimilarityScorer for ExactScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        if (a, b) == ("hari", "hari_seldon") || (a, b) == ("hari_seldon", "hari") {
            90.0
        } else {
            89.0
        }
    }

    fn threshold(&self) -> f64 {
        90.0
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

#[test]
fn score_at_threshold_merges_forms() {
    let clusters = AliasClusterer::new(Box::new(ExactScorer)).cluster(&["Hari", "Hari Seldon", "Dors"]);
    assert_eq!(clusters.len(), 2);
    assert_eq!(members(&clusters[0]), vec!["Hari", "Hari Seldon"]);
    assert_eq!(members(&clusters[1]), vec!["Dors"]);
}

#[test]
fn tagged_fixture_chapter() {
    let pipeline = ChapterPipeline::new(weighted_config()).unwrap();
    let report = pipeline
        .run(ChapterInput::tagged_file(fixture_path("chapter_tagged.txt")).unwrap())
        .unwrap();

    let clusters: Vec<Vec<&str>> = report.clusters.iter().map(members).collect();
    assert_eq!(
        clusters,
        vec![
            vec!["Hari Seldon", "Seldon", "Hari"],
            vec!["Cléon"],
            vec!["Eto Demerzel", "Demerzel"],
            vec!["Dors Venabili", "Dors"],
            vec!["Hummin"],
        ]
    );
    assert_eq!(report.clustering_source, ClusteringSource::Deterministic);
    assert!(report.unresolved.is_empty());

    let graph = &report.graph;
    assert!(graph.edge_weight("Hari Seldon", "Eto Demerzel").is_some());
    assert!(graph.edge_weight("Hari Seldon", "Cléon").is_some());
    assert!(graph.edge_weight("Dors Venabili", "Hummin").is_some());
    assert!(graph.edge_weight("Hari Seldon", "Dors Venabili").is_none());
    assert!(graph.edge_weight("Cléon", "Hummin").is_none());

    let total: u32 = graph.edges().map(|(_, _, weight)| weight).sum();
    assert_eq!(total as usize, report.resolved.len());
}

#[test]
fn ner_json_chapter_is_filtered_and_indexed() {
    let pipeline = ChapterPipeline::new(weighted_config()).unwrap();
    let report = pipeline
        .run(ChapterInput::ner_json_file(fixture_path("ner_chunks.json")).unwrap())
        .unwrap();

    let words: Vec<&str> = report.mentions.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, vec!["Cléon", "Demerzel", "Sire", "Demerzel", "Seldon"]);
    for mention in &report.mentions {
        let found: String = report
            .text
            .chars()
            .skip(mention.start)
            .take(mention.end - mention.start)
            .collect();
        assert_eq!(found, mention.word);
    }

    assert_eq!(report.clusters.len(), 4);
    assert_eq!(report.raw_interactions.len(), 9);
    assert_eq!(report.graph.edge_count(), 6);
    assert_eq!(report.graph.edge_weight("Cléon", "Demerzel"), Some(2));
    assert_eq!(report.graph.edge_weight("Sire", "Demerzel"), Some(2));
}

#[test]
fn batch_to_submission_manifest() {
    let pipeline = ChapterPipeline::new(Config::default()).unwrap();
    let jobs = (1..=2)
        .map(|chapter| ChapterJob {
            id: ChapterId::from_chapter_number("paf", chapter),
            input: ChapterInput::Tagged(load_fixture("chapter_tagged.txt")),
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("submission.csv");
    let mut writer = SubmissionWriter::create(&path).unwrap();
    for (id, result) in BatchRunner::new(&pipeline).run(jobs) {
        writer.write_graph(&id, &result.unwrap().graph).unwrap();
    }
    writer.finish().unwrap();

    let rows = read_submission(&path).unwrap();
    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["paf0", "paf1"]);
    assert!(rows[0].graphml.contains("attr.name=\"names\""));
    assert_eq!(rows[0].graphml, rows[1].graphml);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_batch_matches_sequential() {
    let pipeline = ChapterPipeline::new(Config::default()).unwrap();
    let jobs: Vec<ChapterJob> = (1..=4)
        .map(|chapter| ChapterJob {
            id: ChapterId::from_chapter_number("lca", chapter),
            input: ChapterInput::Tagged(load_fixture("chapter_tagged.txt")),
        })
        .collect();

    let runner = BatchRunner::new(&pipeline);
    let sequential = runner.run(jobs.clone());
    let parallel = runner.run_parallel(jobs);

    for ((seq_id, seq), (par_id, par)) in sequential.into_iter().zip(parallel) {
        assert_eq!(seq_id, par_id);
        assert_eq!(seq.unwrap().graph.to_graphml(), par.unwrap().graph.to_graphml());
    }
}
