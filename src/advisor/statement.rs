use crate::db_types::IndexAdvisoryRow;

/// Terminates each statement when several are submitted as one batch.
const STATEMENT_SEPARATOR: &str = ";\n";

pub fn index_name(row: &IndexAdvisoryRow) -> String {
    format!("missing_index_{}_{}", row.group_handle, row.index_handle)
}

/// Key columns: equality first, then inequality. The comma only appears when
/// both lists are present.
pub fn key_columns(row: &IndexAdvisoryRow) -> String {
    let equality = row.equality_columns.as_deref();
    let inequality = row.inequality_columns.as_deref();

    let mut columns = String::from(equality.unwrap_or(""));
    if equality.is_some() && inequality.is_some() {
        columns.push(',');
    }
    columns.push_str(inequality.unwrap_or(""));
    columns
}

pub fn build_statement(row: &IndexAdvisoryRow) -> String {
    let mut statement = format!(
        "CREATE INDEX {} ON {} ({})",
        index_name(row),
        row.statement,
        key_columns(row)
    );

    if let Some(included) = row.included_columns.as_deref() {
        statement.push_str(&format!(" INCLUDE ({})", included));
    }

    statement
}

pub fn join_batch<S: AsRef<str>>(statements: &[S]) -> String {
    let mut batch = statements
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR);
    if !batch.is_empty() {
        batch.push(';');
    }
    batch
}
