// =====================================================
// MSSQL SPECIFIC DATABASE OPERATIONS (via Tiberius)
// =====================================================

use crate::advisor::{AdvisorySession, Connector};
use crate::db_types::{ConnectionConfig, IndexAdvisoryRow};
use crate::error::TuneError;
use async_trait::async_trait;
use futures::TryStreamExt;
use log::debug;
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, QueryItem, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Missing-index suggestions recorded since the last engine restart, scored
/// and filtered server side. Scores are recomputed client side for ranking.
pub const MISSING_INDEX_QUERY: &str = "
    SELECT
        CAST(mig.index_group_handle AS int) AS group_handle,
        CAST(mid.index_handle AS int) AS index_handle,
        CAST(mid.database_id AS int) AS database_id,
        CAST(mid.[object_id] AS int) AS object_id,
        mid.statement,
        mid.equality_columns,
        mid.inequality_columns,
        mid.included_columns,
        CAST(migs.avg_total_user_cost AS float) AS avg_total_user_cost,
        CAST(migs.avg_user_impact AS float) AS avg_user_impact,
        CAST(migs.user_seeks AS bigint) AS user_seeks,
        CAST(migs.user_scans AS bigint) AS user_scans
    FROM sys.dm_db_missing_index_groups mig
    INNER JOIN sys.dm_db_missing_index_group_stats migs ON migs.group_handle = mig.index_group_handle
    INNER JOIN sys.dm_db_missing_index_details mid ON mig.index_handle = mid.index_handle
    WHERE CONVERT(decimal(28,1), migs.avg_total_user_cost * migs.avg_user_impact * (migs.user_seeks + migs.user_scans)) > 10
    ORDER BY migs.avg_total_user_cost * migs.avg_user_impact * (migs.user_seeks + migs.user_scans) DESC
";

// --- Connection ---

pub fn tiberius_config(config: &ConnectionConfig) -> Config {
    let mut tiberius_config = Config::new();
    tiberius_config.host(&config.server);
    tiberius_config.port(config.port);
    tiberius_config.database(&config.database);
    tiberius_config.authentication(AuthMethod::sql_server(&config.user, &config.password));
    tiberius_config.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });

    if config.trust_server_certificate {
        tiberius_config.trust_cert();
    }

    tiberius_config
}

pub struct MssqlSession {
    client: Client<Compat<TcpStream>>,
}

impl MssqlSession {
    /// Opens a single connection. Azure gateways may answer the login with a
    /// redirect to the node hosting the database; that redirect is followed once.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, TuneError> {
        let mut tiberius_config = tiberius_config(config);
        let mut redirected = false;

        loop {
            let tcp = TcpStream::connect(tiberius_config.get_addr())
                .await
                .map_err(|e| TuneError::Connection(e.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|e| TuneError::Connection(e.to_string()))?;

            match Client::connect(tiberius_config.clone(), tcp.compat_write()).await {
                Ok(client) => return Ok(Self { client }),
                Err(tiberius::error::Error::Routing { host, port }) if !redirected => {
                    debug!("Login redirected to {}:{}", host, port);
                    tiberius_config.host(&host);
                    tiberius_config.port(port);
                    redirected = true;
                }
                Err(e) => return Err(TuneError::Connection(e.to_string())),
            }
        }
    }
}

#[async_trait]
impl AdvisorySession for MssqlSession {
    async fn fetch_candidates(&mut self) -> Result<Vec<IndexAdvisoryRow>, TuneError> {
        let mut stream = self
            .client
            .simple_query(MISSING_INDEX_QUERY)
            .await
            .map_err(|e| TuneError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| TuneError::Query(e.to_string()))?
        {
            if let QueryItem::Row(row) = item {
                rows.push(decode_advisory_row(&row)?);
            }
        }

        Ok(rows)
    }

    async fn execute_batch(&mut self, batch: &str) -> Result<(), TuneError> {
        // Drain every result set so errors raised by later statements surface.
        self.client
            .simple_query(batch)
            .await
            .map_err(|e| TuneError::Apply(e.to_string()))?
            .into_results()
            .await
            .map_err(|e| TuneError::Apply(e.to_string()))?;
        Ok(())
    }
}

pub struct MssqlConnector {
    pub connect_timeout: Option<Duration>,
}

#[async_trait]
impl Connector for MssqlConnector {
    type Session = MssqlSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<MssqlSession, TuneError> {
        match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, MssqlSession::connect(config))
                .await
                .map_err(|_| {
                    TuneError::Connection(format!(
                        "timed out after {}s connecting to {}",
                        limit.as_secs(),
                        config.server
                    ))
                })?,
            None => MssqlSession::connect(config).await,
        }
    }
}

// --- Row Decoding ---

fn required<T>(value: tiberius::Result<Option<T>>, column: &str) -> Result<T, TuneError> {
    value
        .map_err(|e| TuneError::Query(format!("column '{}': {}", column, e)))?
        .ok_or_else(|| TuneError::Query(format!("column '{}' is unexpectedly NULL", column)))
}

fn optional_text(row: &Row, column: &str) -> Result<Option<String>, TuneError> {
    row.try_get::<&str, _>(column)
        .map(|v| v.map(str::to_string))
        .map_err(|e| TuneError::Query(format!("column '{}': {}", column, e)))
}

fn decode_advisory_row(row: &Row) -> Result<IndexAdvisoryRow, TuneError> {
    Ok(IndexAdvisoryRow {
        group_handle: required(row.try_get::<i32, _>("group_handle"), "group_handle")?,
        index_handle: required(row.try_get::<i32, _>("index_handle"), "index_handle")?,
        database_id: required(row.try_get::<i32, _>("database_id"), "database_id")?,
        object_id: required(row.try_get::<i32, _>("object_id"), "object_id")?,
        statement: required(row.try_get::<&str, _>("statement"), "statement")?.to_string(),
        equality_columns: optional_text(row, "equality_columns")?,
        inequality_columns: optional_text(row, "inequality_columns")?,
        included_columns: optional_text(row, "included_columns")?,
        avg_total_user_cost: required(
            row.try_get::<f64, _>("avg_total_user_cost"),
            "avg_total_user_cost",
        )?,
        avg_user_impact: required(row.try_get::<f64, _>("avg_user_impact"), "avg_user_impact")?,
        user_seeks: required(row.try_get::<i64, _>("user_seeks"), "user_seeks")?,
        user_scans: required(row.try_get::<i64, _>("user_scans"), "user_scans")?,
    })
}
