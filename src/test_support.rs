use crate::advisor::AdvisorySession;
use crate::db_types::IndexAdvisoryRow;
use crate::error::TuneError;
use async_trait::async_trait;

/// Records every call so tests can assert on what reached the database.
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub rows: Vec<IndexAdvisoryRow>,
    pub query_error: Option<TuneError>,
    pub execute_error: Option<TuneError>,
    pub queries: usize,
    pub batches: Vec<String>,
}

impl RecordingSession {
    pub fn with_rows(rows: Vec<IndexAdvisoryRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AdvisorySession for RecordingSession {
    async fn fetch_candidates(&mut self) -> Result<Vec<IndexAdvisoryRow>, TuneError> {
        self.queries += 1;
        match &self.query_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.rows.clone()),
        }
    }

    async fn execute_batch(&mut self, batch: &str) -> Result<(), TuneError> {
        self.batches.push(batch.to_string());
        match &self.execute_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

pub fn advisory_row(
    group_handle: i32,
    index_handle: i32,
    measure_inputs: (f64, f64, i64),
) -> IndexAdvisoryRow {
    let (cost, impact, seeks) = measure_inputs;
    IndexAdvisoryRow {
        group_handle,
        index_handle,
        database_id: 5,
        object_id: 1000 + group_handle,
        statement: "[shop].[dbo].[orders]".to_string(),
        equality_columns: Some("[customer_id]".to_string()),
        inequality_columns: None,
        included_columns: Some("[total]".to_string()),
        avg_total_user_cost: cost,
        avg_user_impact: impact,
        user_seeks: seeks,
        user_scans: 0,
    }
}
