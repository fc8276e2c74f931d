// =====================================================
// MISSING INDEX ADVISOR
// Ranks the engine's missing-index suggestions and optionally applies them
// =====================================================

pub mod ranking;
pub mod statement;

use crate::db_types::{ConnectionConfig, IndexAdvisoryRow, IndexCandidate};
use crate::error::TuneError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

pub use ranking::rank_candidates;
pub use statement::{build_statement, join_batch};

/// One open database session. Calls are issued strictly one after another.
#[async_trait]
pub trait AdvisorySession: Send {
    /// Runs the missing-index advisory query.
    async fn fetch_candidates(&mut self) -> Result<Vec<IndexAdvisoryRow>, TuneError>;

    /// Submits `batch` as a single batch. Partial effects are left to the engine.
    async fn execute_batch(&mut self, batch: &str) -> Result<(), TuneError>;
}

/// Opens the one session a command invocation uses.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: AdvisorySession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Session, TuneError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TuneOutcome {
    NoCandidates,
    /// Statements were reported but the database was left untouched.
    Previewed,
    Applied,
    ApplyFailed(TuneError),
}

#[derive(Debug, Clone)]
pub struct TuneReport {
    /// When the advisory statistics were read. They only cover the period
    /// since the engine last restarted.
    pub captured_at: DateTime<Utc>,
    pub candidates: Vec<IndexCandidate>,
    pub outcome: TuneOutcome,
}

impl TuneReport {
    pub fn statements(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(|c| c.create_index_statement.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), TuneError> {
        match self.outcome {
            TuneOutcome::ApplyFailed(e) => Err(e),
            _ => Ok(()),
        }
    }
}

/// Logs the ranked statements, one per line, and returns them in that order.
/// An empty result is logged as its own outcome.
pub fn report(candidates: &[IndexCandidate]) -> Vec<&str> {
    if candidates.is_empty() {
        info!("No missing indexes found");
        return Vec::new();
    }

    match serde_json::to_string(candidates) {
        Ok(json) => debug!("{}", json),
        Err(e) => debug!("Could not serialize candidates: {}", e),
    }

    let statements: Vec<&str> = candidates
        .iter()
        .map(|c| c.create_index_statement.as_str())
        .collect();

    info!("The following indexes might improve the performance of your database:");
    for statement in &statements {
        info!("{}", statement);
    }
    statements
}

pub async fn apply<S>(session: &mut S, candidates: &[IndexCandidate]) -> Result<(), TuneError>
where
    S: AdvisorySession + ?Sized,
{
    let statements: Vec<&str> = candidates
        .iter()
        .map(|c| c.create_index_statement.as_str())
        .collect();
    let batch = join_batch(&statements);
    debug!("{}", batch);

    info!("Executing CREATE INDEX statements");
    session.execute_batch(&batch).await
}

/// Query, rank, report and (when `create_indexes` is set) apply.
///
/// Only a failed query is returned as `Err`; an apply failure is recorded in
/// the report so the ranked statements stay available to the caller.
pub async fn tune<S>(session: &mut S, create_indexes: bool) -> Result<TuneReport, TuneError>
where
    S: AdvisorySession + ?Sized,
{
    info!("Looking for missing index candidates");
    let rows = session.fetch_candidates().await?;
    let captured_at = Utc::now();
    debug!("Advisory query returned {} rows", rows.len());

    let candidates = rank_candidates(rows);
    if report(&candidates).is_empty() {
        return Ok(TuneReport {
            captured_at,
            candidates,
            outcome: TuneOutcome::NoCandidates,
        });
    }

    if !create_indexes {
        warn!(
            "The --create-indexes option was not specified - no changes will be made to the database"
        );
        return Ok(TuneReport {
            captured_at,
            candidates,
            outcome: TuneOutcome::Previewed,
        });
    }

    let outcome = match apply(session, &candidates).await {
        Ok(()) => {
            info!("Indexes created.");
            TuneOutcome::Applied
        }
        Err(e) => TuneOutcome::ApplyFailed(e),
    };

    Ok(TuneReport {
        captured_at,
        candidates,
        outcome,
    })
}

#[cfg(test)]
mod tests;
