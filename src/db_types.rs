// =====================================================
// COMMON DATABASE TYPES AND STRUCTURES
// =====================================================

use serde::Serialize;
use std::fmt;

pub const DEFAULT_SQL_PORT: u16 = 1433;

/// Rows scoring at or below this are not worth reporting.
pub const SIGNIFICANCE_THRESHOLD: f64 = 10.0;

// --- Connection Configuration ---
#[derive(Clone, PartialEq)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

// --- Missing Index Advisory Row ---
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct IndexAdvisoryRow {
    pub group_handle: i32,
    pub index_handle: i32,
    pub database_id: i32,
    pub object_id: i32,
    /// Fully qualified table name, e.g. `[db].[dbo].[orders]`.
    pub statement: String,
    pub equality_columns: Option<String>,
    pub inequality_columns: Option<String>,
    pub included_columns: Option<String>,
    pub avg_total_user_cost: f64,
    /// Percentage, 0-100.
    pub avg_user_impact: f64,
    pub user_seeks: i64,
    pub user_scans: i64,
}

impl IndexAdvisoryRow {
    /// `avg_total_user_cost * avg_user_impact * (user_seeks + user_scans)`,
    /// rounded to one decimal place the way `CONVERT(decimal(28,1), ...)` does.
    pub fn improvement_measure(&self) -> f64 {
        let uses = self.user_seeks.saturating_add(self.user_scans) as f64;
        let raw = self.avg_total_user_cost * self.avg_user_impact * uses;
        (raw * 10.0).round() / 10.0
    }

    pub fn is_significant(&self) -> bool {
        self.improvement_measure() > SIGNIFICANCE_THRESHOLD
    }
}

// --- Index Candidate ---
/// Serialized flat (row fields alongside the score and statement) for the
/// debug-level dump of the ranked results.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct IndexCandidate {
    #[serde(flatten)]
    pub row: IndexAdvisoryRow,
    pub improvement_measure: f64,
    pub create_index_statement: String,
}

#[cfg(test)]
mod tests;
