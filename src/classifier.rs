//! Statistical sentiment classifier and its process-wide handle.
//!
//! The model is a multinomial naive Bayes over word n-gram counts of
//! normalized text. It is persisted as JSON and loaded at most once per
//! `ClassifierHandle`; when the artifact is missing the handle trains one
//! from the bundled dataset and writes it out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AbsaError, Result};
use crate::models::{round_to, Probabilities, SentimentLabel};
use crate::training;

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Anything that can turn normalized text into label probabilities.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, normalized: &str) -> Result<Probabilities>;
}

/// Highest-probability label and its probability. Ties go to Neutral first,
/// then Positive.
pub fn top_label(probabilities: &Probabilities) -> Option<(SentimentLabel, f64)> {
    let mut best: Option<(SentimentLabel, f64)> = None;
    for label in [
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::Negative,
    ] {
        if let Some(&p) = probabilities.get(&label) {
            if best.map_or(true, |(_, current)| p > current) {
                best = Some((label, p));
            }
        }
    }
    best
}

/// Word n-grams (1..=max_n) of an already-normalized string.
pub fn ngrams(normalized: &str, max_n: usize) -> Vec<String> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut grams = Vec::new();
    for n in 1..=max_n.max(1) {
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

fn label_index(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Positive => 0,
        SentimentLabel::Neutral => 1,
        SentimentLabel::Negative => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    version: u32,
    /// Additive smoothing
    alpha: f64,
    max_ngram: usize,
    /// Indexed like `SentimentLabel::ALL`.
    class_log_priors: [f64; 3],
    feature_log_probs: BTreeMap<String, [f64; 3]>,
}

impl NaiveBayesModel {
    /// Fit on pre-normalized documents. Class priors are uniform so that the
    /// over-represented label does not dominate short inputs.
    pub fn fit(documents: &[(String, SentimentLabel)], alpha: f64, max_ngram: usize) -> Result<Self> {
        if documents.is_empty() {
            return Err(AbsaError::TrainingData("no training documents".into()));
        }

        let mut counts: BTreeMap<String, [f64; 3]> = BTreeMap::new();
        let mut totals = [0.0f64; 3];
        let mut seen = [false; 3];

        for (text, label) in documents {
            let idx = label_index(*label);
            seen[idx] = true;
            for gram in ngrams(text, max_ngram) {
                counts.entry(gram).or_insert([0.0; 3])[idx] += 1.0;
                totals[idx] += 1.0;
            }
        }

        if let Some(missing) = SentimentLabel::ALL.iter().find(|l| !seen[label_index(**l)]) {
            return Err(AbsaError::TrainingData(format!(
                "no training documents labelled {missing}"
            )));
        }

        let vocab_size = counts.len() as f64;
        let feature_log_probs = counts
            .into_iter()
            .map(|(gram, class_counts)| {
                let mut log_probs = [0.0; 3];
                for idx in 0..3 {
                    log_probs[idx] = ((class_counts[idx] + alpha)
                        / (totals[idx] + alpha * vocab_size))
                        .ln();
                }
                (gram, log_probs)
            })
            .collect();

        Ok(Self {
            version: MODEL_FORMAT_VERSION,
            alpha,
            max_ngram,
            class_log_priors: [(1.0f64 / 3.0).ln(); 3],
            feature_log_probs,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.feature_log_probs.len()
    }

    /// Probabilities rounded to 4 decimals. Unknown n-grams are ignored, so
    /// fully unseen text gets the prior.
    pub fn probabilities(&self, normalized: &str) -> Probabilities {
        let mut scores = self.class_log_priors;
        for gram in ngrams(normalized, self.max_ngram) {
            if let Some(log_probs) = self.feature_log_probs.get(&gram) {
                for idx in 0..3 {
                    scores[idx] += log_probs[idx];
                }
            }
        }

        let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let sum_exp: f64 = scores.iter().map(|s| (s - max_score).exp()).sum();

        SentimentLabel::ALL
            .into_iter()
            .map(|label| {
                let p = (scores[label_index(label)] - max_score).exp() / sum_exp;
                (label, round_to(p, 4))
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let model: NaiveBayesModel = serde_json::from_slice(&bytes)?;
        if model.version != MODEL_FORMAT_VERSION {
            return Err(AbsaError::ModelUnavailable(format!(
                "{} has format version {}, expected {}",
                path.display(),
                model.version,
                MODEL_FORMAT_VERSION
            )));
        }
        Ok(model)
    }
}

impl Classifier for NaiveBayesModel {
    fn predict_proba(&self, normalized: &str) -> Result<Probabilities> {
        Ok(self.probabilities(normalized))
    }
}

/// Lazily loaded model shared by every resolver call. Construct one at
/// startup and pass it around; the first caller loads (or trains) the model
/// and every later caller reads the cached copy.
#[derive(Debug)]
pub struct ClassifierHandle {
    artifact: PathBuf,
    model: OnceCell<NaiveBayesModel>,
}

impl ClassifierHandle {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            model: OnceCell::new(),
        }
    }

    /// Handle around an already-fitted model; nothing is read from disk.
    pub fn with_model(artifact: impl Into<PathBuf>, model: NaiveBayesModel) -> Self {
        Self {
            artifact: artifact.into(),
            model: OnceCell::with_value(model),
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&NaiveBayesModel> {
        self.model.get_or_try_init(|| load_or_train(&self.artifact))
    }
}

impl Classifier for ClassifierHandle {
    fn predict_proba(&self, normalized: &str) -> Result<Probabilities> {
        self.model()?.predict_proba(normalized)
    }
}

fn load_or_train(artifact: &Path) -> Result<NaiveBayesModel> {
    if artifact.exists() {
        let model = NaiveBayesModel::load(artifact).map_err(|err| match err {
            AbsaError::ModelUnavailable(_) => err,
            other => AbsaError::ModelUnavailable(format!("{}: {other}", artifact.display())),
        })?;
        info!(
            path = %artifact.display(),
            vocab = model.vocab_size(),
            "loaded sentiment model"
        );
        return Ok(model);
    }

    warn!(path = %artifact.display(), "no saved model found, training from bundled dataset");
    let report = training::train_bundled()
        .map_err(|err| AbsaError::ModelUnavailable(format!("training failed: {err}")))?;
    info!(
        accuracy = report.accuracy,
        train_size = report.train_size,
        test_size = report.test_size,
        "trained sentiment model"
    );
    if let Err(err) = report.model.save(artifact) {
        // The in-memory model is still usable for this process.
        warn!(path = %artifact.display(), error = %err, "could not persist trained model");
    } else {
        debug!(path = %artifact.display(), "saved sentiment model");
    }
    Ok(report.model)
}
