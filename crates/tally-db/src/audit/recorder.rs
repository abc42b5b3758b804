//! Best-effort audit recorder.
//!
//! Mutations hand their event batch to [`AuditRecorder::record`] after the
//! write has committed. A background task owns the sink and appends the
//! events one by one. Nothing here can fail the caller: a full queue drops
//! the batch, and a failed append is logged and skipped.

use tokio::sync::{mpsc, oneshot};

use tally_core::entities::AuditEvent;

use super::AuditSink;

enum Command {
    Record(Vec<AuditEvent>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background audit task. Cheap to clone.
#[derive(Clone)]
pub struct AuditRecorder {
    tx: Option<mpsc::Sender<Command>>,
}

impl AuditRecorder {
    /// Spawn the background task on the current tokio runtime.
    ///
    /// The task stops once every handle has been dropped and the queue is
    /// drained.
    #[must_use]
    pub fn spawn<S: AuditSink>(sink: S, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(drain(sink, rx));
        Self { tx: Some(tx) }
    }

    /// A recorder that discards everything (`audit.enabled = false`).
    #[must_use]
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Enqueue a batch without waiting.
    pub fn record(&self, batch: Vec<AuditEvent>) {
        let Some(tx) = &self.tx else {
            return;
        };
        if batch.is_empty() {
            return;
        }
        let entity_id = batch[0].entity_id;
        let len = batch.len();
        match tx.try_send(Command::Record(batch)) {
            Ok(()) => tracing::trace!(%entity_id, events = len, "audit batch queued"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%entity_id, events = len, "audit queue full, batch dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(%entity_id, events = len, "audit recorder stopped, batch dropped");
            }
        }
    }

    /// Wait until every batch queued before this call has been attempted.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack, done) = oneshot::channel();
        if tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

async fn drain<S: AuditSink>(sink: S, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(batch) => {
                for event in &batch {
                    if let Err(error) = sink.append(event).await {
                        tracing::warn!(
                            entity_id = %event.entity_id,
                            actor_id = %event.actor_id,
                            field = %event.field,
                            %error,
                            "audit append failed"
                        );
                    }
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("audit recorder stopped");
}
