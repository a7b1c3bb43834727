//! Aggregate error for a partially failed bulk import.

use search_client_shared::ImportOutcome;
use thiserror::Error;

/// Raised when at least one document of a structured import was rejected.
///
/// Carries every outcome, successes included, in submission order so the
/// caller can tell which documents made it and resubmit only the failed ones.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{succeeded} documents imported successfully, {failed} documents failed during import")]
pub struct ImportError {
    outcomes: Vec<ImportOutcome>,
    succeeded: usize,
    failed: usize,
}

impl ImportError {
    /// Build the aggregate from the full ordered outcome list.
    pub fn new(outcomes: Vec<ImportOutcome>) -> Self {
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        Self {
            succeeded: outcomes.len() - failed,
            failed,
            outcomes,
        }
    }

    /// All outcomes, in the order the documents were submitted.
    pub fn outcomes(&self) -> &[ImportOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<ImportOutcome> {
        self.outcomes
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Failed outcomes with their position in the submitted batch.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ImportOutcome)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(error: &str) -> ImportOutcome {
        ImportOutcome::Failure {
            error: error.to_string(),
            code: 400,
            document: json!({"id": "x"}),
        }
    }

    fn success() -> ImportOutcome {
        ImportOutcome::Success {
            id: None,
            document: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let error = ImportError::new(vec![success(), failure("bad"), success()]);

        assert_eq!(error.succeeded(), 2);
        assert_eq!(error.failed(), 1);
        assert_eq!(
            error.to_string(),
            "2 documents imported successfully, 1 documents failed during import"
        );
    }

    #[test]
    fn test_failures_keep_positions() {
        let error = ImportError::new(vec![failure("a"), success(), failure("b")]);

        let positions: Vec<usize> = error.failures().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(error.outcomes().len(), 3);
    }
}
