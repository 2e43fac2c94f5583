//! The thin statement layer. Each helper prepares one statement, runs it once,
//! and drops it before returning, so no handle outlives the call. Values come
//! back as strings; callers that need types use the per-table modules instead.

use std::io::Write;

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Params};

use crate::models::QueryResult;

/// Execute a mutating statement and return the number of rows it touched.
pub fn run_update<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize> {
    log::debug!("update: {}", compact(sql));
    conn.execute(sql, params)
        .with_context(|| format!("statement failed: {}", compact(sql)))
}

/// Run a query and collect every row as strings, keeping column order.
pub fn run_query_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<QueryResult> {
    log::debug!("query: {}", compact(sql));
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("failed to prepare query: {}", compact(sql)))?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt.query(params).context("failed to execute query")?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch row")? {
        let mut record = Vec::with_capacity(width);
        for idx in 0..width {
            let value = row.get_ref(idx).context("failed to read column value")?;
            record.push(render_value(value));
        }
        collected.push(record);
    }

    Ok(QueryResult {
        columns,
        rows: collected,
    })
}

/// Run a query and write a header line of column names followed by every row,
/// values separated by tabs. Returns the number of rows written.
pub fn run_query_print<P: Params, W: Write>(
    conn: &Connection,
    sql: &str,
    params: P,
    out: &mut W,
) -> Result<usize> {
    let result = run_query_rows(conn, sql, params)?;

    writeln!(out, "{}", result.columns.join("\t")).context("failed to write header")?;
    for row in &result.rows {
        writeln!(out, "{}", row.join("\t")).context("failed to write row")?;
    }
    out.flush().context("failed to flush output")?;

    Ok(result.len())
}

/// Run a query and only report how many rows it produced. Used for existence
/// and authorization checks.
pub fn run_query_count<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize> {
    log::debug!("count: {}", compact(sql));
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("failed to prepare query: {}", compact(sql)))?;
    let mut rows = stmt.query(params).context("failed to execute query")?;

    let mut count = 0usize;
    while rows.next().context("failed to fetch row")?.is_some() {
        count += 1;
    }
    Ok(count)
}

/// Last value handed out by the auto-increment sequence behind `table.column`,
/// or `None` when nothing has been inserted yet. SQLite keys its sequences by
/// table alone; the column only names the sequence in logs.
pub fn current_sequence_value(conn: &Connection, table: &str, column: &str) -> Result<Option<i64>> {
    log::debug!("currval: {}", sequence_name(table, column));
    conn.query_row(
        "SELECT seq FROM sqlite_sequence WHERE name = ?1",
        [table],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read sequence for {table}"))
}

/// Conventional `<lowercased table>_<column>_seq` name, used in log lines so
/// they match what operators know from the server-side schema.
pub fn sequence_name(table: &str, column: &str) -> String {
    format!("{}_{}_seq", table.to_lowercase(), column)
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => {
            if f.is_finite() && f.fract() == 0.0 {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

/// Collapse whitespace so multi-line SQL fits on one log line.
fn compact(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
