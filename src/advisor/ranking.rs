use super::statement::build_statement;
use crate::db_types::{IndexAdvisoryRow, IndexCandidate};

/// Drops rows at or below the significance threshold and orders the rest by
/// improvement measure, highest first. Equal measures keep their input order.
pub fn rank_candidates(rows: Vec<IndexAdvisoryRow>) -> Vec<IndexCandidate> {
    let mut candidates: Vec<IndexCandidate> = rows
        .into_iter()
        .filter(IndexAdvisoryRow::is_significant)
        .map(|row| IndexCandidate {
            improvement_measure: row.improvement_measure(),
            create_index_statement: build_statement(&row),
            row,
        })
        .collect();

    candidates.sort_by(|a, b| b.improvement_measure.total_cmp(&a.improvement_measure));
    candidates
}
