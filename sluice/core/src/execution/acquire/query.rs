use async_trait::async_trait;
use sluice_schemas::DbServer;
use tracing::{debug, instrument};

use super::AcquisitionError;
use crate::blocking::run_blocking;
use crate::execution::traits::Acquirer;
use crate::model::Acquisition;

/// Runs the configured query once and fetches the complete result set
#[derive(Debug, Clone)]
pub struct QueryAcquirer {
    server: DbServer,
}

impl QueryAcquirer {
    pub fn new(server: DbServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Acquirer for QueryAcquirer {
    #[instrument(skip_all, fields(host = %self.server.host, database = %self.server.database), err)]
    async fn acquire(&self) -> Result<Acquisition, AcquisitionError> {
        let connection_string = self.server.connection_string();
        let query = self.server.query.clone();
        let timeout = self.server.timeout;

        debug!("Executing query: {query}");

        let result = run_blocking(move || {
            sluice_odbc::fetch_rows(connection_string.expose(), &query, timeout)
        })
        .await??;

        debug!(
            "Fetched {} row(s) with {} column(s)",
            result.rows.len(),
            result.columns.len()
        );

        Ok(Acquisition::Rows(result))
    }
}
