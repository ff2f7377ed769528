//! Shared fixtures and helpers for castgraph integration tests

#![allow(dead_code)]

pub use castgraph_core::{Chunk, Config, Mention, Result};
use std::fs;

pub const FIXTURE_DIR: &str = "tests/fixtures";

/// Load a fixture file by name
pub fn load_fixture(name: &str) -> String {
    let path = format!("{}/{}", FIXTURE_DIR, name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture '{}': {}", path, e))
}

/// Path of a fixture file
pub fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURE_DIR, name)
}

/// `count` filler words
pub fn filler(count: usize) -> String {
    vec!["mot"; count].join(" ")
}

/// A single chunk with `names` separated by `gaps[i]` filler words
///
/// Mentions get correct character offsets.
pub fn spaced_chunk(names: &[&str], gaps: &[usize]) -> Chunk {
    let mut text = String::new();
    let mut mentions = Vec::new();

    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            let gap = gaps.get(i - 1).copied().unwrap_or(0);
            text.push(' ');
            if gap > 0 {
                text.push_str(&filler(gap));
                text.push(' ');
            }
        }
        let start = text.chars().count();
        text.push_str(name);
        mentions.push(Mention::new(*name, start, start + name.chars().count()));
    }

    Chunk::new(text, mentions)
}

/// Default configuration with a weighted graph
pub fn weighted_config() -> Config {
    let mut config = Config::default();
    config.graph.weighted = true;
    config
}
