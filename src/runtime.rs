use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Which periodic process a timer drives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    Relocate,
    Countdown,
}

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Timer(TimerHandle),
    /// Redraw cadence, produced by the runner when nothing else arrives
    Tick,
}

/// Source of terminal and timer events
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;

    /// Sender that feeds this source, handed to the scheduler so timers land in the same queue
    fn sender(&self) -> Sender<GameEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => GameEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => GameEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if input_tx.send(ev).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<GameEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(0);

/// Handle for a scheduled repeating timer. Ids are unique for the life of
/// the process, so a timer from a finished round never matches a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    kind: TimerKind,
}

impl TimerHandle {
    fn next(kind: TimerKind) -> Self {
        Self {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
            kind,
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

/// Repeating timer facility. Cancelling an unknown or already cancelled
/// handle must be a no-op.
pub trait Scheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, every: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// One sleeping thread per timer, delivering `GameEvent::Timer` into the event queue.
/// A callback already queued when `cancel` runs is still delivered once; the
/// session ignores it after termination.
pub struct ThreadScheduler {
    tx: Sender<GameEvent>,
    live: HashMap<TimerHandle, Arc<AtomicBool>>,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self {
            tx,
            live: HashMap::new(),
        }
    }

    pub fn live_timers(&self) -> usize {
        self.live.len()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, every: Duration) -> TimerHandle {
        let handle = TimerHandle::next(kind);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();

        std::thread::spawn(move || loop {
            std::thread::sleep(every);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(GameEvent::Timer(handle)).is_err() {
                break;
            }
        });

        tracing::debug!(timer = %kind, every_ms = every.as_millis() as u64, "timer scheduled");
        self.live.insert(handle, cancelled);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(flag) = self.live.remove(&handle) {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        for flag in self.live.values() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Scheduler for tests: nothing fires on its own, callers drive timers directly
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub scheduled: Vec<(TimerHandle, TimerKind, Duration)>,
    /// Every cancel call, including repeats and unknown handles
    pub cancel_calls: Vec<TimerHandle>,
    active: Vec<TimerHandle>,
}

impl ManualScheduler {
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.active.contains(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn handle_for(&self, kind: TimerKind) -> Option<TimerHandle> {
        self.scheduled
            .iter()
            .find(|(_, k, _)| *k == kind)
            .map(|(h, _, _)| *h)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, every: Duration) -> TimerHandle {
        let handle = TimerHandle::next(kind);
        self.scheduled.push((handle, kind, every));
        self.active.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.cancel_calls.push(handle);
        self.active.retain(|h| *h != handle);
    }
}
