//! Producer/consumer dispatch pipeline.
//!
//! Producers read the transport stream, decode envelopes, and enqueue one
//! work item per matching command. Consumers run the handlers. Every task
//! runs under [`run_supervised`] and belongs to the current generation's
//! [`JoinSet`]; a restart cancels and drains the old generation first.

use super::command::Command;
use super::context::Context;
use super::directory::GroupDirectory;
use super::handle::BotHandle;
use super::registry::Registry;
use super::supervisor::{run_supervised, Backoff};
use futures_util::FutureExt;
use signalbot_core::{
    config::{DispatchConfig, SupervisorConfig},
    envelope,
    error::SignalError,
    message::Message,
    traits::{AttachmentFetcher, Transport},
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, Notify, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One matched (command, message) pair.
pub struct WorkItem {
    pub command: Arc<dyn Command>,
    pub message: Message,
    pub enqueued_at: Instant,
}

/// Unbounded FIFO shared by all producers and consumers.
///
/// Tracks items that were enqueued but not yet completed, so callers can
/// wait until the pipeline is idle.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::UnboundedSender<WorkItem>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    pub fn push(&self, item: WorkItem) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(item).is_err() {
            // Receiver lives as long as self; unreachable in practice.
            self.complete();
        }
    }

    /// Wait for the next item. `None` once every sender is gone.
    pub async fn pop(&self) -> Option<WorkItem> {
        self.rx.lock().await.recv().await
    }

    /// Mark one popped item as done.
    pub fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Items enqueued but not yet completed.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Completes its item on drop, including when the handler is cancelled.
struct Completion<'a>(&'a WorkQueue);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

/// Pipeline lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Stopped,
    Starting,
    Running,
    Restarting,
}

/// Everything producers and consumers share.
pub(crate) struct Shared {
    pub transport: Arc<dyn Transport>,
    pub fetcher: Arc<dyn AttachmentFetcher>,
    pub download_attachments: bool,
    pub directory: Arc<GroupDirectory>,
    pub registry: Arc<RwLock<Registry>>,
    pub handle: BotHandle,
    pub queue: WorkQueue,
}

struct Generation {
    cancel: CancellationToken,
    tasks: JoinSet<()>,
}

/// Owns the producer and consumer tasks.
pub struct Dispatcher {
    shared: Arc<Shared>,
    dispatch: DispatchConfig,
    supervisor: SupervisorConfig,
    generation: Mutex<Option<Generation>>,
    state: std::sync::Mutex<PipelineState>,
}

impl Dispatcher {
    pub(crate) fn new(
        shared: Shared,
        dispatch: DispatchConfig,
        supervisor: SupervisorConfig,
    ) -> Self {
        Self {
            shared: Arc::new(shared),
            dispatch,
            supervisor,
            generation: Mutex::new(None),
            state: std::sync::Mutex::new(PipelineState::Stopped),
        }
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.shared.queue
    }

    pub fn state(&self) -> PipelineState {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_state(&self, state: PipelineState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
        debug!("pipeline state: {state:?}");
    }

    /// Number of live producer and consumer tasks.
    pub async fn task_count(&self) -> usize {
        self.generation
            .lock()
            .await
            .as_ref()
            .map_or(0, |g| g.tasks.len())
    }

    /// Start (or restart) the pipeline under `parent`.
    ///
    /// Tasks from a previous start are cancelled and awaited before the
    /// new ones spawn, so the queue never has two sets of consumers.
    pub async fn start(&self, parent: &CancellationToken) {
        let mut generation = self.generation.lock().await;

        if let Some(old) = generation.take() {
            self.set_state(PipelineState::Restarting);
            drain(old).await;
        }
        self.set_state(PipelineState::Starting);

        let cancel = parent.child_token();
        let mut tasks = JoinSet::new();

        for n in 1..=self.dispatch.producers {
            let shared = Arc::clone(&self.shared);
            let token = cancel.clone();
            let backoff = Backoff::from_config(&self.supervisor);
            tasks.spawn(async move {
                let name = format!("producer #{n}");
                run_supervised(&name, &token, backoff, || produce(Arc::clone(&shared), n)).await;
            });
        }

        for n in 1..=self.dispatch.consumers {
            let shared = Arc::clone(&self.shared);
            let token = cancel.clone();
            let backoff = Backoff::from_config(&self.supervisor);
            tasks.spawn(async move {
                let name = format!("consumer #{n}");
                run_supervised(&name, &token, backoff, || consume(Arc::clone(&shared), n)).await;
            });
        }

        info!(
            "pipeline started: {} producers, {} consumers",
            self.dispatch.producers, self.dispatch.consumers
        );
        *generation = Some(Generation { cancel, tasks });
        self.set_state(PipelineState::Running);
    }

    /// Cancel every task and wait for them to finish.
    pub async fn stop(&self) {
        if let Some(old) = self.generation.lock().await.take() {
            drain(old).await;
            info!("pipeline stopped");
        }
        self.set_state(PipelineState::Stopped);
    }
}

async fn drain(mut generation: Generation) {
    generation.cancel.cancel();
    while let Some(result) = generation.tasks.join_next().await {
        if let Err(e) = result {
            if !e.is_cancelled() {
                error!("pipeline task ended abnormally: {e}");
            }
        }
    }
}

/// Read the transport stream until it fails.
async fn produce(shared: Arc<Shared>, id: usize) -> Result<(), SignalError> {
    let mut stream = shared.transport.receive().await?;
    info!("Producer #{id} started");

    while let Some(item) = stream.recv().await {
        let raw = item?;
        debug!("raw message: {raw}");

        let fetcher = shared
            .download_attachments
            .then(|| shared.fetcher.as_ref());
        let message = match envelope::decode(&raw, fetcher).await {
            Ok(message) => message,
            Err(e) => {
                debug!("skipping payload: {e}");
                continue;
            }
        };

        if let Some(internal_id) = message.group.as_deref() {
            if shared.directory.by_internal_id(internal_id).is_none() {
                info!("message from unknown group, refreshing directory");
                if let Err(e) = shared.directory.refresh().await {
                    warn!("group refresh failed: {e}");
                }
            }
        }

        let index = shared.directory.snapshot();
        let commands = shared.registry.read().await.matching(&message, &index);
        for command in commands {
            shared.queue.push(WorkItem {
                command,
                message: message.clone(),
                enqueued_at: Instant::now(),
            });
        }
    }

    Err(SignalError::Receive("message stream closed".into()))
}

/// Run handlers until the queue closes. Handler failures stay here.
async fn consume(shared: Arc<Shared>, id: usize) -> Result<(), SignalError> {
    info!("Consumer #{id} started");

    while let Some(item) = shared.queue.pop().await {
        let _done = Completion(&shared.queue);
        info!(
            "Consumer #{id} got new job in {:.5} seconds",
            item.enqueued_at.elapsed().as_secs_f64()
        );

        let name = item.command.name().to_string();
        let ctx = Context::new(item.message, shared.handle.clone());
        match AssertUnwindSafe(item.command.handle(&ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("[{name}] handler failed: {e:#}"),
            Err(panic) => error!("[{name}] handler panicked: {}", panic_message(panic.as_ref())),
        }
    }

    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
