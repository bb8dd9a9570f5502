//! Aspect-based sentiment analysis for student feedback.
//!
//! Detects which institutional aspects a comment talks about (Faculty,
//! Infrastructure, Curriculum, Placements, Management) and assigns a
//! Positive / Neutral / Negative label to the comment and to each aspect.
//! Labels come from a naive Bayes classifier arbitrated against sarcasm
//! patterns and a slang-aware lexicon for short text.

pub mod analyzer;
pub mod aspects;
pub mod classifier;
pub mod clauses;
pub mod config;
pub mod error;
pub mod ingest;
pub mod lexicon;
pub mod models;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod summary;
pub mod training;

pub use analyzer::{categorize, FeedbackAnalyzer};
pub use classifier::{Classifier, ClassifierHandle, NaiveBayesModel};
pub use config::HeuristicsConfig;
pub use error::{AbsaError, Result};
pub use models::{
    Aspect, AspectResult, BatchSummary, FeedbackAnalysis, PredictionResult, SentimentLabel,
};
pub use resolver::SentimentResolver;
pub use summary::summarize;
