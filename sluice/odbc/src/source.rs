//! ODBC source implementation.

use std::time::Duration;

use arrow_odbc::odbc_api::buffers::TextRowSet;
use arrow_odbc::odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tracing::{debug, instrument};

use crate::error::Error;

/// Rows fetched per round trip
const BATCH_SIZE: usize = 1000;

/// Upper bound in bytes for a single text value, guards against unbounded `VARCHAR(MAX)`
/// buffers. Longer values fail the fetch instead of being truncated.
pub const MAX_TEXT_LEN: usize = 64 * 1024;

/// A single result row, `None` represents SQL `NULL`
pub type Row = Vec<Option<String>>;

/// Complete result set of a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names in result-set order
    pub columns: Vec<String>,

    /// Rows in the order returned by the data source
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }
}

/// Execute `query` exactly once and fetch the full result set.
///
/// A statement which does not produce a cursor (e.g. an `UPDATE`) yields an empty result.
/// A value longer than [`MAX_TEXT_LEN`] bytes fails with [`Error::Fetch`]; results are
/// never silently truncated. The connection is closed when this function returns, on
/// every path.
/// ```rust,ignore
/// let connection_string: &str = "\
///     Driver={PostgreSQL Unicode};\
///     Server=localhost;\
///     UID=postgres;\
///     PWD=postgres;\
/// ";
///
/// // make sure to constrain this query to a dataset that is manageable in memory
/// let result = fetch_rows(connection_string, "SELECT * FROM my_table", None)?;
/// ```
#[instrument(skip(connection_string), err)]
pub fn fetch_rows(
    connection_string: &str,
    query: &str,
    login_timeout: Option<Duration>,
) -> crate::Result<QueryResult> {
    let odbc_environment = Environment::new()?;

    let options = ConnectionOptions {
        login_timeout_sec: login_timeout.map(|t| t.as_secs().min(u32::MAX as u64) as u32),
        ..ConnectionOptions::default()
    };

    let connection = odbc_environment
        .connect_with_connection_string(connection_string, options)
        .map_err(Error::Connect)?;

    let parameters = ();

    let Some(mut cursor) = connection
        .execute(query, parameters, None)
        .map_err(Error::Execute)?
    else {
        debug!("Statement produced no cursor, returning empty result");
        return Ok(QueryResult::default());
    };

    let columns = cursor
        .column_names()
        .map_err(Error::Fetch)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(Error::Fetch)?;

    let buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))
        .map_err(Error::Fetch)?;
    let mut row_set_cursor = cursor.bind_buffer(buffers).map_err(Error::Fetch)?;

    let mut rows = Vec::new();
    while let Some(batch) = row_set_cursor
        .fetch_with_truncation_check(true)
        .map_err(Error::Fetch)?
    {
        rows.extend(collect_batch(batch));
    }

    debug!("Fetched {} rows with {} columns", rows.len(), columns.len());

    Ok(QueryResult::new(columns, rows))
}

fn collect_batch(batch: &TextRowSet) -> Vec<Row> {
    (0..batch.num_rows())
        .map(|row| {
            (0..batch.num_cols())
                .map(|col| {
                    batch
                        .at(col, row)
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_default_is_empty() {
        let result = QueryResult::default();

        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
    }

    #[cfg(feature = "odbc_tests")]
    #[test]
    #[tracing_test::traced_test]
    fn test_fetch_rows_ok() {
        let connection_string: &str = "\
            Driver={PostgreSQL Unicode};\
            Server=localhost;\
            UID=postgres;\
            PWD=postgres;\
        ";

        let result = fetch_rows(
            connection_string,
            "SELECT 1 AS id, 'x' AS name UNION ALL SELECT 2, NULL ORDER BY id",
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        assert_eq!(result.columns, vec!["id".to_string(), "name".to_string()]);
        assert_eq!(
            result.rows,
            vec![
                vec![Some("1".to_string()), Some("x".to_string())],
                vec![Some("2".to_string()), None],
            ]
        );
    }

    #[cfg(feature = "odbc_tests")]
    #[test]
    #[tracing_test::traced_test]
    fn test_fetch_rows_bad_connection() {
        let result = fetch_rows(
            "Driver={PostgreSQL Unicode};Server=localhost;UID=nobody;PWD=wrong;",
            "SELECT 1",
            Some(Duration::from_secs(1)),
        );

        assert!(matches!(result, Err(Error::Connect(_))));
    }

    #[cfg(feature = "odbc_tests")]
    #[test]
    #[tracing_test::traced_test]
    fn test_fetch_rows_value_too_long() {
        let connection_string: &str = "\
            Driver={PostgreSQL Unicode};\
            Server=localhost;\
            UID=postgres;\
            PWD=postgres;\
        ";
        let query = format!("SELECT repeat('x', {}) AS payload", MAX_TEXT_LEN + 1);

        let result = fetch_rows(connection_string, &query, Some(Duration::from_secs(5)));

        assert!(matches!(
            result,
            Err(Error::Fetch(arrow_odbc::odbc_api::Error::TooLargeValueForBuffer { .. }))
        ));
    }
}
