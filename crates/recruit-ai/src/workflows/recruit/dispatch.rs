//! Bounded dispatch of workflow runs.
//!
//! Trigger events are admitted into a bounded queue drained by a fixed pool
//! of workers; each run executes the synchronous pipeline on a blocking
//! thread. Dispatch is fire-and-forget from the caller's point of view, but
//! total in-flight work is capped by the queue depth plus the worker count —
//! a full queue is a reported failure, not an unbounded spawn.

use crate::workflows::recruit::corpus::DocumentStore;
use crate::workflows::recruit::matching::ScoreOracle;
use crate::workflows::recruit::notify::MailGateway;
use crate::workflows::recruit::pipeline::RecruitPipeline;
use crate::workflows::recruit::scheduling::CalendarGateway;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// One detected document-store change, reduced to what a run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub document_id: String,
    pub document_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("run queue full, dropping trigger for {0}")]
    QueueFull(String),
    #[error("run workers stopped, cannot dispatch {0}")]
    WorkersStopped(String),
}

/// Handle for enqueueing runs; workers live for the life of the process.
#[derive(Debug, Clone)]
pub struct RunDispatcher {
    queue: mpsc::Sender<TriggerEvent>,
}

impl RunDispatcher {
    /// Start `workers` run workers draining a queue of `queue_depth` slots.
    pub fn spawn<D, O, M, C>(
        pipeline: Arc<RecruitPipeline<D, O, M, C>>,
        workers: usize,
        queue_depth: usize,
    ) -> Self
    where
        D: DocumentStore + 'static,
        O: ScoreOracle + 'static,
        M: MailGateway + 'static,
        C: CalendarGateway + 'static,
    {
        let (queue, receiver) = mpsc::channel::<TriggerEvent>(queue_depth.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        for worker_id in 0..workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                loop {
                    let event = { receiver.lock().await.recv().await };
                    let Some(event) = event else { break };

                    let run_pipeline = Arc::clone(&pipeline);
                    let document = event.document_name.clone();
                    match tokio::task::spawn_blocking(move || run_pipeline.run(event)).await {
                        Ok(summary) => {
                            info!(
                                worker_id,
                                document,
                                outcome = ?summary.outcome,
                                matches = summary.state.match_results.len(),
                                "run finished"
                            );
                        }
                        Err(err) => {
                            error!(worker_id, document, error = %err, "run aborted");
                        }
                    }
                }
                info!(worker_id, "run worker stopped");
            });
        }

        Self { queue }
    }

    /// Enqueue a run without waiting. The event handler never blocks on the
    /// workers; backpressure surfaces as an error to the trigger boundary.
    pub fn submit(&self, event: TriggerEvent) -> Result<(), DispatchError> {
        self.queue.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(event) => DispatchError::QueueFull(event.document_name),
            mpsc::error::TrySendError::Closed(event) => {
                DispatchError::WorkersStopped(event.document_name)
            }
        })
    }
}
