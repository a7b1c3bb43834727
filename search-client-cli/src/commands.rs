//! Command implementations.
//!
//! Each command runs against a [`Documents`] handle and returns the text to
//! print, so the commands can be exercised without a terminal.

use std::fmt;

use serde_json::Value;
use tracing::{info, instrument};

use crate::CliError;
use search_client::{CancellationToken, Documents, SearchClientError, SearchOptions};
use search_client_shared::{
    DeleteOutcome, DeleteTarget, ExportOptions, ImportOptions, ImportOutcome, SearchQuery,
    SearchResponse, WriteOptions,
};

/// Summary of a structured import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub succeeded: usize,
    /// File line (1-based) and error message of each rejected document.
    pub failures: Vec<(usize, String)>,
}

impl ImportReport {
    /// Pair each outcome with the file line its document came from.
    fn from_outcomes(outcomes: &[ImportOutcome], line_numbers: &[usize]) -> Self {
        let failures: Vec<(usize, String)> = outcomes
            .iter()
            .zip(line_numbers)
            .filter_map(|(outcome, line)| outcome.error().map(|error| (*line, error.to_string())))
            .collect();

        Self {
            succeeded: outcomes.len() - failures.len(),
            failures,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.succeeded,
            self.failures.len()
        )?;
        for (line, error) in &self.failures {
            write!(f, "\nline {}: {}", line, error)?;
        }
        Ok(())
    }
}

/// Parse JSONL text into documents with their 1-based line numbers,
/// skipping blank lines.
pub fn parse_jsonl(contents: &str) -> Result<Vec<(usize, Value)>, CliError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map(|document| (index + 1, document))
                .map_err(|e| CliError::input(format!("line {}: {}", index + 1, e)))
        })
        .collect()
}

/// Import the documents of a JSONL file and report per-document outcomes.
#[instrument(skip(documents, contents, options), fields(collection = %documents.collection_name()))]
pub async fn import(
    documents: &Documents,
    contents: &str,
    options: &ImportOptions,
) -> Result<ImportReport, CliError> {
    let (line_numbers, batch): (Vec<usize>, Vec<Value>) =
        parse_jsonl(contents)?.into_iter().unzip();

    let report = match documents.import_documents(&batch, options).await {
        Ok(outcomes) => ImportReport::from_outcomes(&outcomes, &line_numbers),
        Err(SearchClientError::ImportFailed(error)) => {
            ImportReport::from_outcomes(error.outcomes(), &line_numbers)
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "Import finished"
    );
    Ok(report)
}

/// Send a JSONL file untouched and return the service's raw response.
pub async fn import_raw(
    documents: &Documents,
    contents: String,
    options: &ImportOptions,
) -> Result<String, CliError> {
    Ok(documents.import_jsonl(contents, options).await?)
}

pub async fn export(documents: &Documents, options: &ExportOptions) -> Result<String, CliError> {
    Ok(documents.export(options).await?)
}

/// Run a search and render the response as pretty JSON.
pub async fn search(
    documents: &Documents,
    query: &SearchQuery,
    cancellation: CancellationToken,
) -> Result<String, CliError> {
    let response: SearchResponse = documents
        .search(query, SearchOptions::new().with_cancellation(cancellation))
        .await?;
    to_pretty(&response)
}

pub async fn delete(documents: &Documents, target: DeleteTarget) -> Result<String, CliError> {
    match documents.delete(target).await? {
        DeleteOutcome::Document(document) => to_pretty(&document),
        DeleteOutcome::Deleted(response) => to_pretty(&response),
    }
}

/// Upsert one document given as JSON text.
pub async fn upsert(documents: &Documents, json: &str) -> Result<String, CliError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| CliError::input(format!("Invalid document: {}", e)))?;
    if !document.is_object() {
        return Err(CliError::input("Document must be a JSON object"));
    }

    let stored = documents.upsert(&document, &WriteOptions::new()).await?;
    to_pretty(&stored)
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| SearchClientError::from(e).into())
}
