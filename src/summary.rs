use std::collections::BTreeMap;

use crate::models::{round_to, BatchSummary, FeedbackAnalysis, SentimentLabel};

/// Distributional statistics over a batch, recomputed from scratch on every
/// call. An empty batch yields the zeroed summary.
///
/// The per-aspect breakdown is keyed by each analysis's *overall* label, not
/// by the aspect's own result.
pub fn summarize(analyses: &[FeedbackAnalysis]) -> BatchSummary {
    if analyses.is_empty() {
        return BatchSummary::default();
    }

    let total = analyses.len();
    let count = |label: SentimentLabel| {
        analyses
            .iter()
            .filter(|a| a.overall.label == label)
            .count()
    };
    let positive = count(SentimentLabel::Positive);
    let neutral = count(SentimentLabel::Neutral);
    let negative = count(SentimentLabel::Negative);
    let pct = |n: usize| round_to(n as f64 / total as f64 * 100.0, 1);

    let avg_score = analyses.iter().map(|a| a.overall_score).sum::<f64>() / total as f64;

    let mut aspect_counts = BTreeMap::new();
    let mut aspect_sentiment: BTreeMap<_, BTreeMap<SentimentLabel, usize>> = BTreeMap::new();
    for analysis in analyses {
        for &aspect in &analysis.aspects {
            *aspect_counts.entry(aspect).or_insert(0) += 1;
            let breakdown = aspect_sentiment
                .entry(aspect)
                .or_insert_with(|| SentimentLabel::ALL.into_iter().map(|l| (l, 0)).collect());
            *breakdown.entry(analysis.overall.label).or_insert(0) += 1;
        }
    }

    BatchSummary {
        total,
        positive,
        neutral,
        negative,
        positive_pct: pct(positive),
        neutral_pct: pct(neutral),
        negative_pct: pct(negative),
        avg_score: round_to(avg_score, 3),
        aspect_counts,
        aspect_sentiment,
    }
}
