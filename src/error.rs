use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbsaError {
    // Model lifecycle
    #[error("Sentiment model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Training data error: {0}")]
    TrainingData(String),

    // Heuristic tables
    #[error("Invalid heuristic pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // Ingestion
    #[error("No feedback column found (headers: {0})")]
    MissingColumn(String),

    #[error("Workbook {0} has no worksheets")]
    EmptyWorkbook(String),

    #[error("Batch worker failed: {0}")]
    Worker(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AbsaError>;

impl From<tokio::task::JoinError> for AbsaError {
    fn from(value: tokio::task::JoinError) -> Self {
        AbsaError::Worker(value.to_string())
    }
}
