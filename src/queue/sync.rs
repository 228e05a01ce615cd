use crate::backend::QueueBackend;
use crate::queue::model::QueueItem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound on how long teardown waits for an in-flight poll.
const POLL_JOIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Something that can ask for an immediate, out-of-cycle queue poll.
pub trait RefreshHook: Send {
    fn refresh_now(&self);
}

/// Called from the poll thread after each poll result is queued, so the UI
/// can wake up and pump it.
pub type PollNotifier = Box<dyn Fn() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollCommand {
    Refresh,
    Stop,
}

#[derive(Debug)]
enum PollEvent {
    Snapshot(Vec<QueueItem>),
    Failed,
}

/// Cloneable handle to the poll loop's refresh trigger.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    control: Sender<PollCommand>,
}

impl RefreshHook for RefreshHandle {
    fn refresh_now(&self) {
        if self.control.send(PollCommand::Refresh).is_err() {
            tracing::debug!("queue refresh requested after polling stopped");
        }
    }
}

/// The background poll loop. Polls once immediately, then every `interval`
/// and whenever a refresh is requested, until stopped or dropped.
struct PollTimer {
    control: Sender<PollCommand>,
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollTimer {
    fn start(
        backend: Arc<dyn QueueBackend>,
        interval: Duration,
        events: Sender<PollEvent>,
        notify: Option<PollNotifier>,
    ) -> Self {
        let (control_tx, control_rx) = channel::<PollCommand>();
        let stopped = Arc::new(AtomicBool::new(false));
        let loop_stopped = Arc::clone(&stopped);
        let handle = std::thread::Builder::new()
            .name("queue-poll".into())
            .spawn(move || {
                run_poll_loop(
                    backend.as_ref(),
                    interval,
                    &loop_stopped,
                    control_rx,
                    events,
                    notify,
                )
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(error = %err, "failed to spawn queue poll thread");
                None
            }
        };
        Self {
            control: control_tx,
            stopped,
            handle,
        }
    }

    fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            control: self.control.clone(),
        }
    }

    /// Stop the loop. Queued refreshes are discarded; a poll already in
    /// flight is waited on for at most [`POLL_JOIN_TIMEOUT`] and its result is
    /// dropped.
    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.control.send(PollCommand::Stop);
        join_poll_thread_with_timeout(handle);
        tracing::debug!("queue polling stopped");
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join_poll_thread_with_timeout(handle: JoinHandle<()>) {
    let (done_tx, done_rx) = channel();
    std::thread::spawn(move || {
        let join_result = handle.join();
        let _ = done_tx.send(join_result);
    });

    match done_rx.recv_timeout(POLL_JOIN_TIMEOUT) {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::error!("queue poll thread panicked"),
        Err(RecvTimeoutError::Timeout) => {
            tracing::debug!("queue poll still in flight at teardown; detaching")
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::error!("queue poll join channel disconnected")
        }
    }
}

fn run_poll_loop(
    backend: &dyn QueueBackend,
    interval: Duration,
    stopped: &AtomicBool,
    control: Receiver<PollCommand>,
    events: Sender<PollEvent>,
    notify: Option<PollNotifier>,
) {
    let poll = || (!stopped.load(Ordering::SeqCst)).then(|| poll_once(backend));
    let publish = |event: Option<PollEvent>| -> bool {
        let Some(event) = event else {
            return false;
        };
        if stopped.load(Ordering::SeqCst) || events.send(event).is_err() {
            return false;
        }
        if let Some(notify) = &notify {
            notify();
        }
        true
    };

    if !publish(poll()) {
        return;
    }
    let mut next_tick = Instant::now() + interval;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match control.recv_timeout(wait) {
            Ok(PollCommand::Refresh) => {
                if !publish(poll()) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                next_tick = Instant::now() + interval;
                if !publish(poll()) {
                    break;
                }
            }
            Ok(PollCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn poll_once(backend: &dyn QueueBackend) -> PollEvent {
    match backend.fetch_queue() {
        Ok(items) => {
            tracing::debug!(items = items.len(), "queue poll succeeded");
            PollEvent::Snapshot(items)
        }
        Err(err) => {
            tracing::warn!(error = %err, "queue poll failed; keeping previous snapshot");
            PollEvent::Failed
        }
    }
}

/// What the queue panel should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDisplay<'a> {
    Loading,
    Empty,
    Items(&'a [QueueItem]),
}

/// Client-side mirror of the backend queue.
///
/// Owns the latest snapshot and the poll loop. Results produced by the poll
/// thread are applied on [`QueueSync::pump`], which the UI calls every frame.
pub struct QueueSync {
    snapshot: Vec<QueueItem>,
    loaded: bool,
    poll_thread_lost: bool,
    events: Receiver<PollEvent>,
    timer: Option<PollTimer>,
}

impl QueueSync {
    pub fn mount(
        backend: Arc<dyn QueueBackend>,
        interval: Duration,
        notify: Option<PollNotifier>,
    ) -> Self {
        let (events_tx, events_rx) = channel::<PollEvent>();
        let timer = PollTimer::start(backend, interval, events_tx, notify);
        tracing::debug!(interval_ms = interval.as_millis() as u64, "queue polling started");
        Self {
            snapshot: Vec::new(),
            loaded: false,
            poll_thread_lost: false,
            events: events_rx,
            timer: Some(timer),
        }
    }

    /// Handle for triggering an immediate poll. Refreshes requested after
    /// unmount are ignored.
    pub fn refresh_handle(&self) -> RefreshHandle {
        match &self.timer {
            Some(timer) => timer.refresh_handle(),
            None => {
                let (control, _) = channel();
                RefreshHandle { control }
            }
        }
    }

    /// Apply every poll result that has arrived. Returns how many were
    /// applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(PollEvent::Snapshot(items)) => {
                    self.snapshot = items;
                    self.loaded = true;
                    applied += 1;
                }
                Ok(PollEvent::Failed) => {
                    self.loaded = true;
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.timer.is_some() && !self.poll_thread_lost {
                        tracing::error!("queue poll thread exited; queue will no longer update");
                        self.poll_thread_lost = true;
                        self.loaded = true;
                    }
                    break;
                }
            }
        }
        applied
    }

    pub fn display(&self) -> QueueDisplay<'_> {
        if !self.loaded {
            QueueDisplay::Loading
        } else if self.snapshot.is_empty() {
            QueueDisplay::Empty
        } else {
            QueueDisplay::Items(&self.snapshot)
        }
    }

    pub fn snapshot(&self) -> &[QueueItem] {
        &self.snapshot
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The poll thread ended while still mounted (panic or spawn failure).
    pub fn poll_thread_lost(&self) -> bool {
        self.poll_thread_lost
    }

    pub fn is_mounted(&self) -> bool {
        self.timer.is_some()
    }

    /// Stop the poll loop. No poll starts after this returns; one already in
    /// flight is left to finish on its own and its result is discarded.
    pub fn unmount(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
    }
}

impl Drop for QueueSync {
    fn drop(&mut self) {
        self.unmount();
    }
}
