use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Institutional area a comment can talk about. `General` is the fallback
/// when no keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Aspect {
    Faculty,
    Infrastructure,
    Curriculum,
    Placements,
    Management,
    General,
}

impl Aspect {
    /// Keyword-bearing aspects in detection order.
    pub const ALL: [Aspect; 5] = [
        Aspect::Faculty,
        Aspect::Infrastructure,
        Aspect::Curriculum,
        Aspect::Placements,
        Aspect::Management,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Aspect::Faculty => "Faculty",
            Aspect::Infrastructure => "Infrastructure",
            Aspect::Curriculum => "Curriculum",
            Aspect::Placements => "Placements",
            Aspect::Management => "Management",
            Aspect::General => "General",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Aspect::Faculty => "🧑‍🏫",
            Aspect::Infrastructure => "🏛️",
            Aspect::Curriculum => "📚",
            Aspect::Placements => "💼",
            Aspect::Management => "🏢",
            Aspect::General => "💬",
        }
    }

    pub fn parse(name: &str) -> Option<Aspect> {
        let name = name.trim();
        Aspect::ALL
            .into_iter()
            .chain(std::iter::once(Aspect::General))
            .find(|aspect| aspect.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn score(self) -> i32 {
        match self {
            SentimentLabel::Positive => 1,
            SentimentLabel::Neutral => 0,
            SentimentLabel::Negative => -1,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "#2ecc71",
            SentimentLabel::Neutral => "#f1c40f",
            SentimentLabel::Negative => "#e74c3c",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "😊",
            SentimentLabel::Neutral => "😐",
            SentimentLabel::Negative => "😞",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type Probabilities = BTreeMap<SentimentLabel, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub probabilities: Probabilities,
}

impl PredictionResult {
    pub fn empty() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            probabilities: Probabilities::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectResult {
    pub aspect: Aspect,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub score: i32,
    pub probabilities: Probabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    pub original_text: String,
    pub normalized_text: String,
    pub aspects: Vec<Aspect>,
    pub overall: PredictionResult,
    pub overall_score: f64,
    pub aspect_results: Vec<AspectResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    pub avg_score: f64,
    pub aspect_counts: BTreeMap<Aspect, usize>,
    pub aspect_sentiment: BTreeMap<Aspect, BTreeMap<SentimentLabel, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackCategory {
    pub label: String,
    pub is_generic: bool,
    pub aspects: Vec<Aspect>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
