//! NER evaluation against `<PER>`-tagged gold text
//!
//! A predicted span is a true positive when a gold span has the same words at
//! the same position in the tag-stripped text, otherwise a false positive.
//! Gold spans with no identical prediction are false negatives.

use std::path::Path;

use crate::ner::{parse_tagged_text, TaggedSpan};
use crate::Result;

/// Span-level NER scores
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NerMetrics {
    /// Predicted spans matching a gold span
    pub true_positives: usize,
    /// Predicted spans matching no gold span
    pub false_positives: usize,
    /// Gold spans matched by no prediction
    pub false_negatives: usize,
    /// `tp / (tp + fp)`
    pub precision: f64,
    /// `tp / (tp + fn)`
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// `tp / (tp + fp + fn)`
    pub accuracy: f64,
}

impl NerMetrics {
    /// Derive the ratios from raw counts; an empty denominator gives 0.0
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1,
            accuracy: ratio(true_positives, true_positives + false_positives + false_negatives),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Compare predicted and gold spans
pub fn span_metrics(predicted: &[TaggedSpan], gold: &[TaggedSpan]) -> NerMetrics {
    let true_positives = predicted.iter().filter(|span| gold.contains(span)).count();
    let false_positives = predicted.len() - true_positives;
    let false_negatives = gold.iter().filter(|span| !predicted.contains(span)).count();
    NerMetrics::from_counts(true_positives, false_positives, false_negatives)
}

/// Compare two `<PER>`-tagged versions of the same text
pub fn ner_metrics(predicted: &str, gold: &str) -> NerMetrics {
    let predicted = parse_tagged_text(predicted);
    let gold = parse_tagged_text(gold);
    if predicted.text != gold.text {
        tracing::warn!("predicted and gold texts differ once tags are removed");
    }
    span_metrics(&predicted.spans, &gold.spans)
}

/// Compare two `<PER>`-tagged files
pub fn ner_metrics_from_files<P: AsRef<Path>, Q: AsRef<Path>>(predicted: P, gold: Q) -> Result<NerMetrics> {
    let predicted = std::fs::read_to_string(predicted)?;
    let gold = std::fs::read_to_string(gold)?;
    Ok(ner_metrics(&predicted, &gold))
}
