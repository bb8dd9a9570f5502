use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use tracing::{info, warn};

use crate::error::{AbsaError, Result};

/// Header names recognised as the feedback column, after trimming,
/// lowercasing and replacing spaces with underscores.
pub const ACCEPTED_COLUMNS: &[&str] = &[
    "feedback", "feedbacks", "report", "reports", "response", "responses", "opinion",
    "opinions", "review", "reviews", "judgement", "judgements", "judgment", "judgments", "note",
    "notes", "comment", "comments", "text", "texts", "remark", "remarks", "suggestion",
    "suggestions", "observation", "observations", "entry", "entries", "input", "inputs",
    "answer", "answers", "student_feedback", "student_response", "student_comment",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRows {
    pub column: String,
    pub texts: Vec<String>,
    pub skipped: usize,
}

/// Extensions read as spreadsheets; anything else is parsed as CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn canonical_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Index of the feedback column: the explicitly requested header if given,
/// else the first header in `ACCEPTED_COLUMNS`.
pub fn find_feedback_column<S: AsRef<str>>(headers: &[S], requested: Option<&str>) -> Option<usize> {
    match requested {
        Some(name) => {
            let wanted = canonical_header(name);
            headers
                .iter()
                .position(|h| canonical_header(h.as_ref()) == wanted)
        }
        None => headers
            .iter()
            .position(|h| ACCEPTED_COLUMNS.contains(&canonical_header(h.as_ref()).as_str())),
    }
}

fn resolve_column(headers: &[String], requested: Option<&str>) -> Result<(usize, String)> {
    let index = find_feedback_column(headers, requested)
        .ok_or_else(|| AbsaError::MissingColumn(headers.join(", ")))?;
    Ok((index, headers[index].clone()))
}

/// Keeps non-blank cells of the chosen column, counting the rest.
fn collect_feedback<I>(column: String, cells: I) -> Result<FeedbackRows>
where
    I: Iterator<Item = Result<Option<String>>>,
{
    let mut texts = Vec::new();
    let mut skipped = 0usize;
    for cell in cells {
        match cell? {
            Some(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, column = %column, "skipped rows without feedback text");
    }
    info!(rows = texts.len(), column = %column, "loaded feedback rows");

    Ok(FeedbackRows {
        column,
        texts,
        skipped,
    })
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Loads feedback from a CSV file or, by extension, an Excel/ODS workbook.
pub fn load_feedback(path: &Path, requested: Option<&str>) -> Result<FeedbackRows> {
    if is_workbook(path) {
        load_feedback_workbook(path, requested)
    } else {
        load_feedback_csv(path, requested)
    }
}

pub fn load_feedback_csv(path: &Path, requested: Option<&str>) -> Result<FeedbackRows> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    read_feedback(reader, requested)
}

/// Reads the feedback column, skipping blank cells and short rows.
pub fn read_feedback<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    requested: Option<&str>,
) -> Result<FeedbackRows> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let (index, column) = resolve_column(&headers, requested)?;
    let cells = reader
        .records()
        .map(|record| -> Result<Option<String>> { Ok(record?.get(index).map(str::to_string)) });
    collect_feedback(column, cells)
}

/// Reads the first worksheet; its first row holds the headers.
pub fn load_feedback_workbook(path: &Path, requested: Option<&str>) -> Result<FeedbackRows> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AbsaError::EmptyWorkbook(path.display().to_string()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let (index, column) = resolve_column(&headers, requested)?;
    let cells = rows.map(|row| -> Result<Option<String>> {
        Ok(row.get(index).map(|cell| cell.to_string()))
    });
    collect_feedback(column, cells)
}
