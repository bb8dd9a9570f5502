use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexicon::LexiconTables;

pub const DEFAULT_MODEL_PATH: &str = "model/sentiment_model.json";
pub const MODEL_PATH_ENV: &str = "FEEDBACK_MODEL_PATH";

/// Decision boundaries of the hybrid resolver. The defaults were hand-tuned
/// against a small synthetic dataset and may need recalibration on real
/// feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverThresholds {
    /// Sarcasm flips Positive/Neutral to Negative only below this confidence.
    pub sarcasm_confidence_ceiling: f64,
    pub sarcasm_confidence_bump: f64,
    pub sarcasm_confidence_cap: f64,
    /// The lexicon overrides the classifier only below this confidence.
    pub lexicon_confidence_ceiling: f64,
    /// Confidence reported when the lexicon decides.
    pub lexicon_confidence: f64,
    /// Word-count fallback applies to texts with at most this many tokens.
    pub lexicon_max_tokens: usize,
    /// Clauses shorter than this many characters are dropped.
    pub min_clause_chars: usize,
}

impl Default for ResolverThresholds {
    fn default() -> Self {
        Self {
            sarcasm_confidence_ceiling: 0.70,
            sarcasm_confidence_bump: 0.15,
            sarcasm_confidence_cap: 0.88,
            lexicon_confidence_ceiling: 0.55,
            lexicon_confidence: 0.82,
            lexicon_max_tokens: 5,
            min_clause_chars: 6,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub thresholds: ResolverThresholds,
    pub lexicon: LexiconTables,
}

impl HeuristicsConfig {
    /// Reads a JSON file; fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// `--model` beats `FEEDBACK_MODEL_PATH`, which beats the default location.
pub fn resolve_model_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(MODEL_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}
