use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BatchSummary, FeedbackAnalysis, SentimentLabel};
use crate::summary::summarize;

/// One batch invocation: the analyses plus the summary computed from them.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub summary: BatchSummary,
    pub analyses: Vec<FeedbackAnalysis>,
}

impl BatchRun {
    pub fn new(source: impl Into<String>, analyses: Vec<FeedbackAnalysis>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: source.into(),
            summary: summarize(&analyses),
            analyses,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// One row per feedback: text, aspects, overall sentiment, confidence, score.
    pub fn write_results_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["feedback", "aspects", "sentiment", "confidence", "score"])?;
        for analysis in &self.analyses {
            let aspects: Vec<&str> = analysis.aspects.iter().map(|a| a.name()).collect();
            let aspects = aspects.join(", ");
            let confidence = format!("{:.1}%", analysis.overall.confidence * 100.0);
            let score = format!("{:.3}", analysis.overall_score);
            writer.write_record([
                analysis.original_text.as_str(),
                aspects.as_str(),
                analysis.overall.label.name(),
                confidence.as_str(),
                score.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn build_report(run: &BatchRun) -> String {
    let summary = &run.summary;
    let mut output = String::new();

    let _ = writeln!(output, "# Student Feedback Sentiment Report");
    let _ = writeln!(
        output,
        "Generated for {} at {} (run {})",
        run.source,
        run.generated_at.format("%Y-%m-%d %H:%M UTC"),
        run.run_id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment Mix");

    if summary.total == 0 {
        let _ = writeln!(output, "No feedback analysed.");
        return output;
    }

    for (label, count, pct) in [
        (SentimentLabel::Positive, summary.positive, summary.positive_pct),
        (SentimentLabel::Neutral, summary.neutral, summary.neutral_pct),
        (SentimentLabel::Negative, summary.negative, summary.negative_pct),
    ] {
        let _ = writeln!(
            output,
            "- {} {}: {} ({:.1}%)",
            label.emoji(),
            label,
            count,
            pct
        );
    }
    let _ = writeln!(
        output,
        "- Total: {} comments, average score {:+.3}",
        summary.total, summary.avg_score
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Aspect Coverage");

    let mut aspects: Vec<_> = summary.aspect_counts.iter().collect();
    aspects.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (aspect, count) in aspects {
        let breakdown = summary.aspect_sentiment.get(aspect);
        let share = |label: SentimentLabel| {
            breakdown
                .and_then(|b| b.get(&label))
                .copied()
                .unwrap_or(0)
        };
        let _ = writeln!(
            output,
            "- {} {}: {} mentions ({} positive, {} neutral, {} negative)",
            aspect.icon(),
            aspect,
            count,
            share(SentimentLabel::Positive),
            share(SentimentLabel::Neutral),
            share(SentimentLabel::Negative)
        );
    }

    let mut lowest: Vec<&FeedbackAnalysis> = run
        .analyses
        .iter()
        .filter(|a| a.overall_score < 0.0)
        .collect();
    lowest.sort_by(|a, b| {
        a.overall_score
            .partial_cmp(&b.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Negative Feedback");

    if lowest.is_empty() {
        let _ = writeln!(output, "No comments scored below zero.");
    } else {
        for analysis in lowest.iter().take(5) {
            let aspects: Vec<&str> = analysis.aspects.iter().map(|a| a.name()).collect();
            let _ = writeln!(
                output,
                "- \"{}\" ({}; score {:+.2})",
                analysis.original_text,
                aspects.join(", "),
                analysis.overall_score
            );
        }
    }

    output
}
