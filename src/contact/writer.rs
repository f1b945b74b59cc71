//! Single writer task
//!
//! Every append goes through one task that owns the write side of the
//! contacts file, so rows from concurrent submissions never interleave.
//! Each request waits on a oneshot reply carrying the append result.

use super::record::ContactRecord;
use super::store::ContactStore;
use crate::error::{ContactError, Result};
use crate::logger;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

struct AppendRequest {
    record: ContactRecord,
    reply: oneshot::Sender<Result<()>>,
}

/// Sending side of the writer queue
///
/// The task exits once every handle has been dropped and the queue drained.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<AppendRequest>,
}

impl WriterHandle {
    /// Queue a record and wait until it is on disk
    pub async fn append(&self, record: ContactRecord) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(AppendRequest { record, reply })
            .await
            .map_err(|_| ContactError::WriterClosed)?;
        done.await.map_err(|_| ContactError::WriterClosed)?
    }
}

/// Start the writer task; the join handle resolves to the number of rows written
pub fn spawn(store: ContactStore, capacity: usize) -> (WriterHandle, JoinHandle<usize>) {
    let (tx, mut rx) = mpsc::channel::<AppendRequest>(capacity.max(1));

    let task = tokio::spawn(async move {
        let mut written = 0_usize;
        while let Some(AppendRequest { record, reply }) = rx.recv().await {
            let result = store.append(record).await;
            match &result {
                Ok(()) => written += 1,
                Err(e) => logger::log_error(&format!(
                    "Failed to append contact to {}: {e}",
                    store.path().display()
                )),
            }
            // requester may have gone away (client disconnect)
            let _ = reply.send(result);
        }
        logger::log_writer_stopped(written);
        written
    });

    (WriterHandle { tx }, task)
}

/// Wait for the writer to flush its queue and exit
///
/// Returns the rows written, or `None` when the task is still running after
/// `timeout` (some handle is still alive) or has failed.
pub async fn drain(task: JoinHandle<usize>, timeout: Duration) -> Option<usize> {
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(written)) => Some(written),
        Ok(Err(e)) => {
            logger::log_error(&format!("Contact writer task failed: {e}"));
            None
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Contact writer still busy after {}s, pending appends may be lost",
                timeout.as_secs_f32()
            ));
            None
        }
    }
}
