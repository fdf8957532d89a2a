//! Store gateway - one SQLite connection per logical operation

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use super::{schema, seed};
use crate::{Error, Result};

/// Default time a connection waits on a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection parameters for the store.
///
/// Supplied once at construction; the gateway never reads ambient state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
    /// Create the database file when it does not exist yet.
    /// Off for serving, so a wrong path surfaces as `StoreUnavailable`.
    pub create_if_missing: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            create_if_missing: false,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

/// Hands out scoped connections.
///
/// Every call to [`StoreGateway::with_connection`] opens a fresh connection and
/// closes it when the closure returns, whatever the outcome. There is no pool:
/// replacing this with a bounded pool keeps the same signature.
#[derive(Debug, Clone)]
pub struct StoreGateway {
    config: Arc<StoreConfig>,
}

impl StoreGateway {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Gateway for a database file, failing if the file is missing
    pub fn open(path: &Path) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Acquire a connection, or fail with `StoreUnavailable` before any query runs
    fn connect(&self) -> Result<Connection> {
        let path = &self.config.path;
        let unavailable =
            |e: rusqlite::Error| Error::StoreUnavailable(format!("{}: {}", path.display(), e));

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(path, flags).map_err(unavailable)?;
        conn.busy_timeout(self.config.busy_timeout)
            .map_err(unavailable)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(unavailable)?;
        // Forces the file to be read now instead of on the first real query.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(unavailable)?;

        Ok(conn)
    }

    /// Run `f` on a connection scoped to this call.
    ///
    /// The connection is dropped on every exit path. Errors from `f` are
    /// returned unchanged.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let result = f(&mut conn);

        if let Err(e) = conn.close() {
            // The handle is released on drop anyway; a failed close only loses the error.
            tracing::warn!("Failed to close connection cleanly: {}", e.1);
        }

        if let Err(ref e) = result {
            tracing::debug!("Scoped store call failed: {}", e);
        }
        result
    }

    /// [`StoreGateway::with_connection`] on tokio's blocking pool.
    ///
    /// Store I/O never runs on the async worker threads, so a slow query only
    /// holds up its own request.
    pub async fn with_connection_async<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let gateway = self.clone();
        tokio::task::spawn_blocking(move || gateway.with_connection(f))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Create any missing tables and indexes
    pub fn initialize_schema(&self) -> Result<()> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            for stmt in schema::all_schema_statements() {
                tx.execute(stmt, [])?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// Upsert reference rows. Returns the number of rows written.
    pub fn seed(&self, data: &seed::SeedData) -> Result<usize> {
        self.with_connection(|conn| seed::seed_reference_data(conn, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StoreGateway::open(&dir.path().join("missing.db"));

        let mut ran = false;
        let err = gateway
            .with_connection(|_| {
                ran = true;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(!ran);
        assert!(!dir.path().join("missing.db").exists());
    }

    #[test]
    fn test_create_if_missing_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.db");
        let gateway = StoreGateway::new(StoreConfig::new(&path).with_create_if_missing(true));

        gateway.initialize_schema().unwrap();
        // Idempotent
        gateway.initialize_schema().unwrap();

        let tables: i64 = gateway
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
                     AND name IN ('students', 'groups', 'curricula', 'sciences')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn test_foreign_keys_enabled_per_connection() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StoreGateway::new(
            StoreConfig::new(dir.path().join("fk.db")).with_create_if_missing(true),
        );

        let enabled: i64 = gateway
            .with_connection(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_closure_error_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StoreGateway::new(
            StoreConfig::new(dir.path().join("err.db")).with_create_if_missing(true),
        );

        let err = gateway
            .with_connection::<(), _>(|conn| {
                conn.execute("SELECT * FROM no_such_table", [])?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        // The gateway keeps working after a failed call
        gateway.with_connection(|_| Ok(())).unwrap();
    }
}
