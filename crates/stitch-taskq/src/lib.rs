//! Replace-pending task queue for coalescing recomputation.
//!
//! Callers that recompute derived state on fast-changing input (a diff or
//! rebase re-run on every keystroke) want at most one computation running
//! and only the newest request waiting behind it. [`ReplaceableTaskQueue`]
//! keeps a single running task and a single pending slot: enqueueing while
//! idle starts the task, enqueueing while busy parks it in the pending
//! slot, replacing whatever was parked there. A running task always runs
//! to completion and publishes its output before the parked task starts.
//!
//! # Architecture
//!
//! A coordinator task owns all queue state; the queue value is a
//! cheap-to-clone handle that sends commands over an unbounded channel.
//! Outputs of successful tasks are published on a broadcast channel in
//! completion order. A failed task is logged and swallowed; it never stops
//! the queue.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stitch_taskq::ReplaceableTaskQueue;
//!
//! let queue = ReplaceableTaskQueue::new();
//! let mut outputs = queue.subscribe();
//!
//! queue.enqueue(async move { recompute(&input) });
//! queue.enqueue(async move { recompute(&newer_input) }); // replaces pending
//!
//! queue.wait_for_idle().await;
//! while let Ok(state) = outputs.try_recv() {
//!     // newest state wins
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{broadcast, mpsc, oneshot};

/// Completed outputs a slow subscriber may lag behind before losing some.
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

type TaskFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>>;

enum QueueCommand<T> {
    Enqueue { task: TaskFuture<T> },
    WaitForIdle { response_tx: oneshot::Sender<()> },
    Shutdown,
}

/// Single-slot task queue: one task running, at most one waiting, and a
/// newer waiting task replaces the older one.
pub struct ReplaceableTaskQueue<T> {
    tx: mpsc::UnboundedSender<QueueCommand<T>>,
    outputs: broadcast::Sender<T>,
}

impl<T> Clone for ReplaceableTaskQueue<T> {
    fn clone(&self) -> Self {
        ReplaceableTaskQueue {
            tx: self.tx.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> ReplaceableTaskQueue<T> {
    /// Create a queue and spawn its coordinator task.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (outputs, _) = broadcast::channel(OUTPUT_CHANNEL_CAPACITY);
        tokio::spawn(run(rx, outputs.clone()));
        ReplaceableTaskQueue { tx, outputs }
    }

    /// Queue a task.
    ///
    /// Starts immediately when nothing is running, otherwise parks in the
    /// pending slot, replacing any task already parked there. A replaced
    /// task never runs and publishes nothing.
    pub fn enqueue<F>(&self, task: F)
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let _ = self.tx.send(QueueCommand::Enqueue {
            task: Box::pin(task),
        });
    }

    /// Subscribe to outputs of successfully completed tasks, in completion
    /// order.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.outputs.subscribe()
    }

    /// Resolve once nothing is running or pending.
    ///
    /// Resolves immediately when the queue is already idle, and also when
    /// the coordinator has shut down.
    pub async fn wait_for_idle(&self) {
        let (response_tx, response_rx) = oneshot::channel();
        if self
            .tx
            .send(QueueCommand::WaitForIdle { response_tx })
            .is_err()
        {
            return;
        }
        let _ = response_rx.await;
    }

    /// Stop the coordinator. Running and parked tasks are dropped.
    pub fn shutdown(&self) {
        let _ = self.tx.send(QueueCommand::Shutdown);
    }

    /// Whether the coordinator is still accepting commands.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl<T: Clone + Send + 'static> Default for ReplaceableTaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordinator loop. Owns the running task, the pending slot, and the
/// waiters parked on idleness.
async fn run<T: Clone + Send + 'static>(
    mut rx: mpsc::UnboundedReceiver<QueueCommand<T>>,
    outputs: broadcast::Sender<T>,
) {
    tracing::debug!("task queue coordinator started");

    let mut running: Option<TaskFuture<T>> = None;
    let mut pending: Option<TaskFuture<T>> = None;
    let mut idle_waiters: Vec<oneshot::Sender<()>> = Vec::new();

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(QueueCommand::Enqueue { task }) => {
                    if running.is_none() {
                        running = Some(task);
                    } else {
                        if pending.is_some() {
                            tracing::debug!("replacing pending task with newer request");
                        }
                        pending = Some(task);
                    }
                }
                Some(QueueCommand::WaitForIdle { response_tx }) => {
                    if running.is_none() && pending.is_none() {
                        let _ = response_tx.send(());
                    } else {
                        idle_waiters.push(response_tx);
                    }
                }
                Some(QueueCommand::Shutdown) | None => break,
            },
            result = poll_running(&mut running), if running.is_some() => {
                match result {
                    Ok(output) => {
                        let _ = outputs.send(output);
                    }
                    Err(error) => {
                        tracing::warn!("queued task failed: {:#}", error);
                    }
                }
                running = pending.take();
                if running.is_none() {
                    for waiter in idle_waiters.drain(..) {
                        let _ = waiter.send(());
                    }
                }
            }
        }
    }

    tracing::debug!("task queue coordinator stopped");
}

/// Await the running task. Pends forever when there is none; the select
/// guard keeps this branch disabled in that case.
async fn poll_running<T>(running: &mut Option<TaskFuture<T>>) -> anyhow::Result<T> {
    match running {
        Some(task) => task.as_mut().await,
        None => std::future::pending().await,
    }
}
