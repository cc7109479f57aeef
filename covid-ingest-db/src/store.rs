//! Shared handle to the time-series database.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::operations::OperationError;
use crate::schema::{self, SchemaError};

/// Cloneable handle to one SQLite connection.
///
/// This is the writers' handle: a pipeline holds the lock for the whole of
/// its transaction, so anything else locking the same `Store` waits for the
/// run to finish. Readers open their own connection with
/// [`open_database`](crate::open_database) and see the last committed batch
/// through WAL.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        schema::open_database(path).map(Self::new)
    }

    /// Fresh in-memory database with the full schema.
    pub fn open_memory() -> Result<Self, SchemaError> {
        schema::open_memory().map(Self::new)
    }

    /// Lock the connection.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, OperationError> {
        self.conn.lock().map_err(|_| OperationError::LockPoisoned)
    }
}
