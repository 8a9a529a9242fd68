//! Single writer for the SQLite database.
//!
//! Every write job runs on one dedicated thread, inside its own immediate
//! transaction. A job that returns `Err` is rolled back in full; jobs never
//! interleave, so two refresh runs cannot race on the same rows.

use std::thread;

use countryxchange_core::errors::{DatabaseError, Error, Result};
use diesel::sqlite::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use super::{get_connection, DbPool};
use crate::errors::StorageError;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Cloneable handle for submitting jobs to the writer thread.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

/// Carries either the job's own error or a transaction-management failure.
enum TxError {
    Job(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

impl From<TxError> for Error {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Job(e) => e,
            TxError::Diesel(e) => {
                let mapped: Error = StorageError::from(e).into();
                match mapped {
                    Error::Database(db) => {
                        Error::Database(DatabaseError::TransactionFailed(db.to_string()))
                    }
                    other => other,
                }
            }
        }
    }
}

impl WriteHandle {
    /// Runs `job` in a transaction on the writer thread and returns its result.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<T>>();
        let wrapped: WriteJob = Box::new(move |conn: &mut SqliteConnection| {
            let outcome = conn
                .immediate_transaction::<T, TxError, _>(|tx| job(tx).map_err(TxError::Job))
                .map_err(Error::from);
            let _ = reply_tx.send(outcome);
        });

        self.sender.send(wrapped).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Database writer has stopped".to_string(),
            ))
        })?;

        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Database writer dropped the job".to_string(),
            ))
        })?
    }
}

/// Starts the writer thread. It exits once every `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();

    thread::Builder::new()
        .name("sqlite-writer".to_string())
        .spawn(move || {
            while let Some(job) = receiver.blocking_recv() {
                match get_connection(&pool) {
                    Ok(mut conn) => job(&mut *conn),
                    // Dropping the job drops its reply sender; the caller sees the failure.
                    Err(e) => error!("Writer could not acquire a connection: {}", e),
                }
            }
            debug!("Database writer stopped");
        })
        .unwrap_or_else(|e| panic!("failed to spawn database writer thread: {e}"));

    WriteHandle { sender }
}
