//! Per-document command queue.
//!
//! One tokio task (a document worker) owns one document's queue — an
//! actor/mailbox arrangement, so the single-processing-command invariant
//! needs no shared-state locking. Commands for the same document execute
//! strictly in enqueue order; commands for different documents are fully
//! independent.
//!
//! Invariants enforced here:
//! - at most one command per document is `processing` at a time;
//! - pending capacity is bounded; enqueueing past it is a hard error;
//! - a `pending` command may be cancelled by its originator, a `processing`
//!   command may not;
//! - a command still pending past the wait budget is timed out and removed
//!   without ever being executed;
//! - observers are notified with queue contents + head on every transition.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use easel_domain::core::string::truncate;
use easel_domain::{Command, CommandStatus, QueueEntry};

use crate::ports::processor::{
    CommandFailure, CommandJob, CommandProcessor, CommandVerdict, ErrorKind,
};
use crate::ports::queue_observer::{QueueObserverPort, QueueSnapshot};
use crate::ports::reasoning::{TokenUsage, TranscriptMessage};

/// Errors surfaced by queue admission and cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Command queue for document {document_id} is full (capacity {capacity})")]
    CapacityExceeded {
        document_id: String,
        capacity: usize,
    },

    #[error("Command {0} is already processing and cannot be cancelled")]
    NotCancellable(String),

    #[error("Command {0} may only be cancelled by its originator")]
    NotOriginator(String),

    #[error("Command {0} was not found in the queue")]
    UnknownCommand(String),

    #[error("Queue worker for document {0} is not running")]
    WorkerStopped(String),
}

/// Terminal outcome delivered to the submitter.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command was processed to completion or failure
    Finished(CommandVerdict),
    /// Cancelled by its originator while still pending
    Cancelled,
    /// Exceeded the pending wait budget and was never executed
    TimedOut,
}

/// Queue admission limits.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Maximum pending commands per document
    pub capacity: usize,
    /// Wall-clock budget a command may spend pending
    pub pending_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            pending_timeout: Duration::from_secs(30),
        }
    }
}

enum WorkerMessage {
    Submit {
        command: Command,
        history: Vec<TranscriptMessage>,
        reply: oneshot::Sender<Result<CommandOutcome, QueueError>>,
    },
    Cancel {
        command_id: String,
        user_id: String,
        ack: oneshot::Sender<Result<(), QueueError>>,
    },
}

struct PendingCommand {
    entry: QueueEntry,
    history: Vec<TranscriptMessage>,
    deadline: Instant,
    reply: oneshot::Sender<Result<CommandOutcome, QueueError>>,
}

struct ActiveCommand {
    command: Command,
    reply: oneshot::Sender<Result<CommandOutcome, QueueError>>,
    handle: JoinHandle<CommandVerdict>,
}

/// The command queue: routes submissions to per-document workers.
pub struct CommandQueue<P: CommandProcessor + 'static> {
    processor: Arc<P>,
    observers: Vec<Arc<dyn QueueObserverPort>>,
    config: QueueConfig,
    shutdown: CancellationToken,
    workers: Mutex<HashMap<String, mpsc::Sender<WorkerMessage>>>,
}

impl<P: CommandProcessor + 'static> CommandQueue<P> {
    pub fn new(processor: Arc<P>, config: QueueConfig) -> Self {
        Self {
            processor,
            observers: Vec::new(),
            config,
            shutdown: CancellationToken::new(),
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Register an observer; call before the first submission
    pub fn with_observer(mut self, observer: Arc<dyn QueueObserverPort>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Token that stops every document worker when cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Enqueue a command and wait for its terminal outcome.
    pub async fn submit(
        &self,
        command: Command,
        history: Vec<TranscriptMessage>,
    ) -> Result<CommandOutcome, QueueError> {
        let document_id = command.document_id.clone();
        let sender = self.worker_for(&document_id).await;
        let (reply, outcome) = oneshot::channel();
        sender
            .send(WorkerMessage::Submit {
                command,
                history,
                reply,
            })
            .await
            .map_err(|_| QueueError::WorkerStopped(document_id.clone()))?;
        outcome
            .await
            .map_err(|_| QueueError::WorkerStopped(document_id))?
    }

    /// Cancel a pending command on behalf of `user_id`.
    pub async fn cancel(
        &self,
        document_id: &str,
        command_id: &str,
        user_id: &str,
    ) -> Result<(), QueueError> {
        let sender = {
            let workers = self.workers.lock().await;
            workers
                .get(document_id)
                .filter(|s| !s.is_closed())
                .cloned()
        };
        let Some(sender) = sender else {
            return Err(QueueError::UnknownCommand(command_id.to_string()));
        };
        let (ack, result) = oneshot::channel();
        sender
            .send(WorkerMessage::Cancel {
                command_id: command_id.to_string(),
                user_id: user_id.to_string(),
                ack,
            })
            .await
            .map_err(|_| QueueError::WorkerStopped(document_id.to_string()))?;
        result
            .await
            .map_err(|_| QueueError::WorkerStopped(document_id.to_string()))?
    }

    async fn worker_for(&self, document_id: &str) -> mpsc::Sender<WorkerMessage> {
        let mut workers = self.workers.lock().await;
        if let Some(sender) = workers.get(document_id)
            && !sender.is_closed()
        {
            return sender.clone();
        }

        let (sender, mailbox) = mpsc::channel(32);
        let worker = DocumentWorker {
            document_id: document_id.to_string(),
            processor: self.processor.clone(),
            observers: self.observers.clone(),
            config: self.config,
            shutdown: self.shutdown.clone(),
        };
        tokio::spawn(worker.run(mailbox));
        workers.insert(document_id.to_string(), sender.clone());
        debug!(document_id, "Document worker started");
        sender
    }
}

/// The actor that owns one document's queue.
struct DocumentWorker<P: CommandProcessor + 'static> {
    document_id: String,
    processor: Arc<P>,
    observers: Vec<Arc<dyn QueueObserverPort>>,
    config: QueueConfig,
    shutdown: CancellationToken,
}

impl<P: CommandProcessor + 'static> DocumentWorker<P> {
    async fn run(self, mut mailbox: mpsc::Receiver<WorkerMessage>) {
        let mut pending: VecDeque<PendingCommand> = VecDeque::new();
        let mut active: Option<ActiveCommand> = None;
        let mut mailbox_open = true;

        loop {
            if active.is_none() {
                active = self.start_next(&mut pending);
            }
            if !mailbox_open && active.is_none() && pending.is_empty() {
                break;
            }

            // FIFO with a uniform budget, so the head expires first
            let next_deadline = pending.front().map(|p| p.deadline);

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    self.drain(&mut pending, &mut active);
                    return;
                }

                message = mailbox.recv(), if mailbox_open => {
                    match message {
                        Some(WorkerMessage::Submit { command, history, reply }) => {
                            self.handle_submit(&mut pending, active.as_ref(), command, history, reply);
                        }
                        Some(WorkerMessage::Cancel { command_id, user_id, ack }) => {
                            self.handle_cancel(&mut pending, active.as_ref(), &command_id, &user_id, ack);
                        }
                        None => mailbox_open = false,
                    }
                }

                result = poll_active(&mut active), if active.is_some() => {
                    let finished = active.take().expect("guarded by active.is_some()");
                    self.finalize(finished, result, &pending);
                }

                _ = tokio::time::sleep_until(next_deadline.unwrap_or_else(Instant::now)),
                    if next_deadline.is_some() =>
                {
                    self.expire_stale(&mut pending, active.as_ref());
                }
            }
        }
        debug!(document_id = %self.document_id, "Document worker finished");
    }

    fn handle_submit(
        &self,
        pending: &mut VecDeque<PendingCommand>,
        active: Option<&ActiveCommand>,
        command: Command,
        history: Vec<TranscriptMessage>,
        reply: oneshot::Sender<Result<CommandOutcome, QueueError>>,
    ) {
        if pending.len() >= self.config.capacity {
            warn!(
                document_id = %self.document_id,
                command_id = %command.id,
                capacity = self.config.capacity,
                "Queue full, rejecting command"
            );
            let _ = reply.send(Err(QueueError::CapacityExceeded {
                document_id: self.document_id.clone(),
                capacity: self.config.capacity,
            }));
            return;
        }

        info!(
            document_id = %self.document_id,
            command_id = %command.id,
            position = pending.len(),
            text = %truncate(&command.text, 80),
            "Command enqueued"
        );
        pending.push_back(PendingCommand {
            entry: QueueEntry::new(command, Utc::now()),
            history,
            deadline: Instant::now() + self.config.pending_timeout,
            reply,
        });
        self.notify(active.map(|a| a.command.id.as_str()), pending);
    }

    fn handle_cancel(
        &self,
        pending: &mut VecDeque<PendingCommand>,
        active: Option<&ActiveCommand>,
        command_id: &str,
        user_id: &str,
        ack: oneshot::Sender<Result<(), QueueError>>,
    ) {
        if active.is_some_and(|a| a.command.id == command_id) {
            let _ = ack.send(Err(QueueError::NotCancellable(command_id.to_string())));
            return;
        }

        let Some(index) = pending
            .iter()
            .position(|p| p.entry.command.id == command_id)
        else {
            let _ = ack.send(Err(QueueError::UnknownCommand(command_id.to_string())));
            return;
        };

        if pending[index].entry.command.user_id != user_id {
            let _ = ack.send(Err(QueueError::NotOriginator(command_id.to_string())));
            return;
        }

        let mut removed = pending.remove(index).expect("index from position()");
        if let Err(error) = removed.entry.command.transition_to(CommandStatus::Cancelled) {
            warn!(command_id, %error, "Unexpected cancel transition");
        }
        info!(document_id = %self.document_id, command_id, "Command cancelled");
        let _ = removed.reply.send(Ok(CommandOutcome::Cancelled));
        let _ = ack.send(Ok(()));
        self.notify(active.map(|a| a.command.id.as_str()), pending);
    }

    /// Pop the next non-stale pending command and start processing it.
    fn start_next(&self, pending: &mut VecDeque<PendingCommand>) -> Option<ActiveCommand> {
        while let Some(mut next) = pending.pop_front() {
            // A stale command never silently executes late
            if Instant::now() >= next.deadline {
                self.time_out(&mut next);
                let _ = next.reply.send(Ok(CommandOutcome::TimedOut));
                continue;
            }

            let mut command = next.entry.command;
            if let Err(error) = command.transition_to(CommandStatus::Processing) {
                warn!(command_id = %command.id, %error, "Unexpected processing transition");
            }
            info!(
                document_id = %self.document_id,
                command_id = %command.id,
                "Command processing started"
            );

            let job = CommandJob::new(command.clone(), next.history);
            let processor = self.processor.clone();
            let handle = tokio::spawn(async move { processor.process(&job).await });

            self.notify(Some(command.id.as_str()), pending);
            return Some(ActiveCommand {
                command,
                reply: next.reply,
                handle,
            });
        }
        None
    }

    fn finalize(
        &self,
        mut finished: ActiveCommand,
        result: Result<CommandVerdict, tokio::task::JoinError>,
        pending: &VecDeque<PendingCommand>,
    ) {
        let verdict = result.unwrap_or_else(|join_error| {
            CommandVerdict::failed(
                CommandFailure::new(
                    ErrorKind::InternalError,
                    format!("Command processing task failed: {}", join_error),
                ),
                "",
                Vec::new(),
                TokenUsage::default(),
            )
        });

        let status = if verdict.is_success() {
            CommandStatus::Completed
        } else {
            CommandStatus::Failed
        };
        if let Err(error) = finished.command.transition_to(status) {
            warn!(command_id = %finished.command.id, %error, "Unexpected terminal transition");
        }
        info!(
            document_id = %self.document_id,
            command_id = %finished.command.id,
            status = %status,
            "Command finished"
        );

        let _ = finished.reply.send(Ok(CommandOutcome::Finished(verdict)));
        self.notify(None, pending);
    }

    /// Fail every pending command whose wait budget has elapsed.
    fn expire_stale(
        &self,
        pending: &mut VecDeque<PendingCommand>,
        active: Option<&ActiveCommand>,
    ) {
        let now = Instant::now();
        let mut expired = false;
        while let Some(front) = pending.front() {
            if front.deadline > now {
                break;
            }
            let mut stale = pending.pop_front().expect("front() was Some");
            self.time_out(&mut stale);
            let _ = stale.reply.send(Ok(CommandOutcome::TimedOut));
            expired = true;
        }
        if expired {
            self.notify(active.map(|a| a.command.id.as_str()), pending);
        }
    }

    fn time_out(&self, stale: &mut PendingCommand) {
        if let Err(error) = stale.entry.command.transition_to(CommandStatus::TimedOut) {
            warn!(command_id = %stale.entry.command.id, %error, "Unexpected timeout transition");
        }
        warn!(
            document_id = %self.document_id,
            command_id = %stale.entry.command.id,
            "Command timed out while pending"
        );
    }

    fn drain(&self, pending: &mut VecDeque<PendingCommand>, active: &mut Option<ActiveCommand>) {
        info!(document_id = %self.document_id, "Document worker shutting down");
        if let Some(running) = active.take() {
            running.handle.abort();
        }
        for entry in pending.drain(..) {
            let _ = entry
                .reply
                .send(Err(QueueError::WorkerStopped(self.document_id.clone())));
        }
    }

    fn notify(&self, processing: Option<&str>, pending: &VecDeque<PendingCommand>) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = QueueSnapshot {
            document_id: self.document_id.clone(),
            processing: processing.map(String::from),
            pending: pending
                .iter()
                .map(|p| p.entry.command.id.clone())
                .collect(),
        };
        for observer in &self.observers {
            observer.on_queue_changed(&snapshot);
        }
    }
}

async fn poll_active(
    active: &mut Option<ActiveCommand>,
) -> Result<CommandVerdict, tokio::task::JoinError> {
    match active.as_mut() {
        Some(running) => (&mut running.handle).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    fn command(id: &str, document: &str, user: &str) -> Command {
        Command::new(id, document, user, "do something", Utc::now())
    }

    fn ok_verdict() -> CommandVerdict {
        CommandVerdict::success("done", vec![], TokenUsage::default())
    }

    /// Processor that records processing windows, sleeping a fixed time
    struct SlowProcessor {
        duration: Duration,
        windows: StdMutex<Vec<(String, Instant, Instant)>>,
    }

    impl SlowProcessor {
        fn new(duration: Duration) -> Self {
            Self {
                duration,
                windows: StdMutex::new(Vec::new()),
            }
        }

        fn windows(&self) -> Vec<(String, Instant, Instant)> {
            self.windows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandProcessor for SlowProcessor {
        async fn process(&self, job: &CommandJob) -> CommandVerdict {
            let started = Instant::now();
            tokio::time::sleep(self.duration).await;
            self.windows
                .lock()
                .unwrap()
                .push((job.command.id.clone(), started, Instant::now()));
            ok_verdict()
        }
    }

    /// Processor that blocks until released, recording what it executed
    struct BlockingProcessor {
        release: Notify,
        executed: StdMutex<Vec<String>>,
    }

    impl BlockingProcessor {
        fn new() -> Self {
            Self {
                release: Notify::new(),
                executed: StdMutex::new(Vec::new()),
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandProcessor for BlockingProcessor {
        async fn process(&self, job: &CommandJob) -> CommandVerdict {
            self.executed.lock().unwrap().push(job.command.id.clone());
            self.release.notified().await;
            ok_verdict()
        }
    }

    /// Observer that records every queue snapshot
    struct TrackingObserver {
        snapshots: StdMutex<Vec<QueueSnapshot>>,
    }

    impl TrackingObserver {
        fn new() -> Self {
            Self {
                snapshots: StdMutex::new(Vec::new()),
            }
        }

        fn snapshots(&self) -> Vec<QueueSnapshot> {
            self.snapshots.lock().unwrap().clone()
        }
    }

    impl QueueObserverPort for TrackingObserver {
        fn on_queue_changed(&self, snapshot: &QueueSnapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }
    }

    /// Submit in the background, letting the worker receive it before returning
    async fn spawn_submit(
        queue: &Arc<CommandQueue<BlockingProcessor>>,
        command: Command,
    ) -> JoinHandle<Result<CommandOutcome, QueueError>> {
        let queue = queue.clone();
        let handle = tokio::spawn(async move { queue.submit(command, vec![]).await });
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle
    }

    #[tokio::test(start_paused = true)]
    async fn processing_windows_never_overlap_per_document() {
        let processor = Arc::new(SlowProcessor::new(Duration::from_millis(100)));
        let queue = Arc::new(CommandQueue::new(processor.clone(), QueueConfig::default()));

        let first = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit(command("cmd-1", "doc-1", "u1"), vec![]).await })
        };
        let second = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit(command("cmd-2", "doc-1", "u1"), vec![]).await })
        };

        assert!(matches!(
            first.await.unwrap().unwrap(),
            CommandOutcome::Finished(_)
        ));
        assert!(matches!(
            second.await.unwrap().unwrap(),
            CommandOutcome::Finished(_)
        ));

        let windows = processor.windows();
        assert_eq!(windows.len(), 2);
        let (_, _, first_end) = &windows[0];
        let (_, second_start, _) = &windows[1];
        assert!(
            second_start >= first_end,
            "processing windows overlap: {:?}",
            windows
        );
    }

    #[tokio::test(start_paused = true)]
    async fn different_documents_process_concurrently() {
        let processor = Arc::new(SlowProcessor::new(Duration::from_millis(100)));
        let queue = Arc::new(CommandQueue::new(processor.clone(), QueueConfig::default()));

        let started = Instant::now();
        let a = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit(command("cmd-a", "doc-a", "u1"), vec![]).await })
        };
        let b = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit(command("cmd-b", "doc-b", "u1"), vec![]).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Independent documents overlap: total time is one processing window
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_pending_command_is_rejected_with_capacity_error() {
        let processor = Arc::new(BlockingProcessor::new());
        let queue = Arc::new(CommandQueue::new(processor.clone(), QueueConfig::default()));

        // First command starts processing, the next five fill the queue
        let mut handles = Vec::new();
        for i in 1..=6 {
            let cmd = command(&format!("cmd-{}", i), "doc-1", "u1");
            handles.push(spawn_submit(&queue, cmd).await);
        }

        let rejected = queue.submit(command("cmd-7", "doc-1", "u1"), vec![]).await;
        assert_eq!(
            rejected.unwrap_err(),
            QueueError::CapacityExceeded {
                document_id: "doc-1".to_string(),
                capacity: 5
            }
        );

        // Release all six queued commands; they complete in enqueue order
        for _ in 0..6 {
            processor.release.notify_one();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        for handle in handles {
            assert!(matches!(
                handle.await.unwrap().unwrap(),
                CommandOutcome::Finished(_)
            ));
        }
        assert_eq!(
            processor.executed(),
            vec!["cmd-1", "cmd-2", "cmd-3", "cmd-4", "cmd-5", "cmd-6"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_pending_command_times_out_and_never_executes() {
        let processor = Arc::new(BlockingProcessor::new());
        let queue = Arc::new(CommandQueue::new(processor.clone(), QueueConfig::default()));

        let head = spawn_submit(&queue, command("cmd-1", "doc-1", "u1")).await;
        let queued = spawn_submit(&queue, command("cmd-2", "doc-1", "u1")).await;

        let started = Instant::now();
        // cmd-1 blocks forever, so the only runnable timer is cmd-2's deadline
        let outcome = queued.await.unwrap().unwrap();
        assert!(matches!(outcome, CommandOutcome::TimedOut));
        let waited = started.elapsed();
        assert!(
            waited >= Duration::from_secs(29) && waited <= Duration::from_secs(31),
            "expected ~30s pending timeout, waited {:?}",
            waited
        );

        processor.release.notify_one();
        assert!(matches!(
            head.await.unwrap().unwrap(),
            CommandOutcome::Finished(_)
        ));
        // The timed-out command never reached the processor
        assert_eq!(processor.executed(), vec!["cmd-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_command_cancellable_by_originator_only() {
        let processor = Arc::new(BlockingProcessor::new());
        let queue = Arc::new(CommandQueue::new(processor.clone(), QueueConfig::default()));

        let head = spawn_submit(&queue, command("cmd-1", "doc-1", "alice")).await;
        let queued = spawn_submit(&queue, command("cmd-2", "doc-1", "alice")).await;

        // Another user cannot cancel it
        assert_eq!(
            queue.cancel("doc-1", "cmd-2", "mallory").await.unwrap_err(),
            QueueError::NotOriginator("cmd-2".to_string())
        );

        // The originator can
        queue.cancel("doc-1", "cmd-2", "alice").await.unwrap();
        assert!(matches!(
            queued.await.unwrap().unwrap(),
            CommandOutcome::Cancelled
        ));

        // The processing command cannot be cancelled
        assert_eq!(
            queue.cancel("doc-1", "cmd-1", "alice").await.unwrap_err(),
            QueueError::NotCancellable("cmd-1".to_string())
        );

        // Unknown commands are reported as such
        assert_eq!(
            queue.cancel("doc-1", "cmd-99", "alice").await.unwrap_err(),
            QueueError::UnknownCommand("cmd-99".to_string())
        );

        processor.release.notify_one();
        head.await.unwrap().unwrap();
        assert_eq!(processor.executed(), vec!["cmd-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn observers_see_every_transition_with_contents_and_head() {
        let processor = Arc::new(BlockingProcessor::new());
        let observer = Arc::new(TrackingObserver::new());
        let queue = Arc::new(
            CommandQueue::new(processor.clone(), QueueConfig::default())
                .with_observer(observer.clone()),
        );

        let head = spawn_submit(&queue, command("cmd-1", "doc-1", "u1")).await;
        let queued = spawn_submit(&queue, command("cmd-2", "doc-1", "u1")).await;

        // cmd-2 sits at position 0 of the pending queue while cmd-1 processes
        let snapshots = observer.snapshots();
        let waiting = snapshots
            .iter()
            .find(|s| s.processing.as_deref() == Some("cmd-1") && !s.pending.is_empty())
            .expect("snapshot with a processing head and pending entries");
        assert_eq!(waiting.position_of("cmd-2"), Some(0));

        processor.release.notify_one();
        tokio::time::sleep(Duration::from_millis(1)).await;
        processor.release.notify_one();
        head.await.unwrap().unwrap();
        queued.await.unwrap().unwrap();

        let snapshots = observer.snapshots();
        // Terminal notification leaves an empty queue with no head
        let last = snapshots.last().unwrap();
        assert_eq!(last.processing, None);
        assert!(last.pending.is_empty());
        // cmd-2 was observed processing after cmd-1 finished
        assert!(
            snapshots
                .iter()
                .any(|s| s.processing.as_deref() == Some("cmd-2"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_verdicts_still_finish_the_command() {
        struct FailingProcessor;

        #[async_trait]
        impl CommandProcessor for FailingProcessor {
            async fn process(&self, _job: &CommandJob) -> CommandVerdict {
                CommandVerdict::failed(
                    CommandFailure::new(ErrorKind::ValidationError, "bad reference"),
                    "",
                    vec![],
                    TokenUsage::default(),
                )
            }
        }

        let queue = CommandQueue::new(Arc::new(FailingProcessor), QueueConfig::default());
        let outcome = queue
            .submit(command("cmd-1", "doc-1", "u1"), vec![])
            .await
            .unwrap();

        match outcome {
            CommandOutcome::Finished(verdict) => {
                assert!(!verdict.is_success());
                assert_eq!(verdict.failure.unwrap().kind, ErrorKind::ValidationError);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
