use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::encoder::RawInput;
use super::{AssessmentError, ScoreResult};

/// Column carrying a caller-chosen identifier rather than a feature.
pub const APPLICATION_ID_COLUMN: &str = "application_id";

/// One application in a batch request or CSV import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchApplication {
    #[serde(default)]
    pub application_id: String,
    pub features: RawInput,
}

/// Per-application result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub application_id: String,
    pub outcome: Result<ScoreResult, AssessmentError>,
}

impl BatchOutcome {
    pub fn view(&self) -> BatchOutcomeView {
        match &self.outcome {
            Ok(result) => BatchOutcomeView {
                application_id: self.application_id.clone(),
                result: Some(*result),
                error: None,
            },
            Err(err) => BatchOutcomeView {
                application_id: self.application_id.clone(),
                result: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Serialized shape of a batch outcome: either the score fields or an `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcomeView {
    pub application_id: String,
    #[serde(flatten)]
    pub result: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applications: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applications CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub fn read_applications_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<BatchApplication>, BatchError> {
    let file = std::fs::File::open(path)?;
    read_applications(file)
}

/// Parses a CSV whose header row names features. Empty cells are left out so the
/// schema default applies.
pub fn read_applications<R: Read>(reader: R) -> Result<Vec<BatchApplication>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut applications = Vec::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut application_id = format!("row-{}", row + 1);
        let mut features = RawInput::new();

        for (column, cell) in headers.iter().zip(record.iter()) {
            if column == APPLICATION_ID_COLUMN {
                if !cell.is_empty() {
                    application_id = cell.to_string();
                }
                continue;
            }
            if let Some(value) = parse_cell(cell) {
                features.insert(column, value);
            }
        }

        applications.push(BatchApplication {
            application_id,
            features,
        });
    }

    Ok(applications)
}

fn parse_cell(cell: &str) -> Option<Value> {
    if cell.is_empty() {
        return None;
    }

    match cell.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Some(Value::Bool(true)),
        "false" | "no" => return Some(Value::Bool(false)),
        _ => {}
    }

    let value = cell
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()));
    Some(value)
}
