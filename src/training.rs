use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::classifier::{top_label, NaiveBayesModel};
use crate::error::{AbsaError, Result};
use crate::models::{round_to, LabelMetrics, SentimentLabel, TrainingExample};
use crate::normalize::normalize;

const BUNDLED_DATASET: &str = include_str!("../data/training.csv");

pub const SMOOTHING_ALPHA: f64 = 1.0;
pub const MAX_NGRAM: usize = 3;
/// Every n-th example of each label is held out for evaluation.
pub const HOLDOUT_EVERY: usize = 5;

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: NaiveBayesModel,
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub per_label: BTreeMap<SentimentLabel, LabelMetrics>,
}

pub fn bundled_examples() -> Result<Vec<TrainingExample>> {
    read_examples(csv::Reader::from_reader(BUNDLED_DATASET.as_bytes()))
}

/// Reads a `text,label` CSV.
pub fn load_examples(path: &Path) -> Result<Vec<TrainingExample>> {
    read_examples(csv::Reader::from_path(path)?)
}

fn read_examples<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<TrainingExample>> {
    let mut examples = Vec::new();
    for row in reader.deserialize::<TrainingExample>() {
        let example = row?;
        if !example.text.trim().is_empty() {
            examples.push(example);
        }
    }
    if examples.is_empty() {
        return Err(AbsaError::TrainingData("dataset has no usable rows".into()));
    }
    Ok(examples)
}

/// Deterministic stratified split: within each label, every
/// `HOLDOUT_EVERY`-th example (in file order) goes to the test side.
pub fn stratified_split(
    examples: &[TrainingExample],
) -> (Vec<&TrainingExample>, Vec<&TrainingExample>) {
    let mut seen: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
    let mut train = Vec::new();
    let mut test = Vec::new();

    for example in examples {
        let position = seen.entry(example.label).or_insert(0);
        *position += 1;
        if *position % HOLDOUT_EVERY == 0 {
            test.push(example);
        } else {
            train.push(example);
        }
    }

    (train, test)
}

pub fn train(examples: &[TrainingExample]) -> Result<TrainingReport> {
    let (train_set, test_set) = stratified_split(examples);

    let documents: Vec<(String, SentimentLabel)> = train_set
        .iter()
        .map(|e| (normalize(&e.text), e.label))
        .collect();
    let model = NaiveBayesModel::fit(&documents, SMOOTHING_ALPHA, MAX_NGRAM)?;
    debug!(vocab = model.vocab_size(), "fitted n-gram vocabulary");

    let predictions: Vec<(SentimentLabel, SentimentLabel)> = test_set
        .iter()
        .map(|e| {
            let probs = model.probabilities(&normalize(&e.text));
            let predicted = top_label(&probs)
                .map(|(label, _)| label)
                .unwrap_or(SentimentLabel::Neutral);
            (e.label, predicted)
        })
        .collect();

    let correct = predictions.iter().filter(|(gold, pred)| gold == pred).count();
    let accuracy = if predictions.is_empty() {
        0.0
    } else {
        round_to(correct as f64 / predictions.len() as f64, 4)
    };

    Ok(TrainingReport {
        model,
        accuracy,
        train_size: train_set.len(),
        test_size: test_set.len(),
        per_label: label_metrics(&predictions),
    })
}

pub fn train_bundled() -> Result<TrainingReport> {
    train(&bundled_examples()?)
}

fn label_metrics(
    predictions: &[(SentimentLabel, SentimentLabel)],
) -> BTreeMap<SentimentLabel, LabelMetrics> {
    SentimentLabel::ALL
        .into_iter()
        .map(|label| {
            let tp = predictions.iter().filter(|(g, p)| *g == label && *p == label).count();
            let predicted = predictions.iter().filter(|(_, p)| *p == label).count();
            let support = predictions.iter().filter(|(g, _)| *g == label).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            (
                label,
                LabelMetrics {
                    precision: round_to(precision, 4),
                    recall: round_to(recall, 4),
                    f1: round_to(f1, 4),
                    support,
                },
            )
        })
        .collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
