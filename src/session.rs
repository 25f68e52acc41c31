//! One round of the game: owns score, lives, the countdown and the active
//! cell, and reacts to timer callbacks and pointer-down events.
//!
//! All handlers run to completion on the event loop thread. Every handler
//! that mutates state first checks that the round is [`Phase::Running`], so a
//! timer callback that was already queued when the round ended is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::audio::AudioSink;
use crate::board::{CellId, CELL_COUNT};
use crate::config::SessionConfig;
use crate::runtime::{Scheduler, TimerHandle, TimerKind};
use crate::sinks::{Notifier, ViewSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum EndReason {
    #[strum(to_string = "time ran out.")]
    TimeUp,
    #[strum(to_string = "your lives ran out.")]
    LivesExhausted,
}

pub const GAME_OVER_SOUND: &str = "game_over";

pub fn lives_label(lives: i32) -> String {
    format!("x{lives}")
}

pub fn game_over_message(reason: EndReason, score: u32) -> String {
    format!("Game Over! {reason} Final score: {score}")
}

pub struct GameSession<V, A, N, S>
where
    V: ViewSink,
    A: AudioSink,
    N: Notifier,
    S: Scheduler,
{
    config: SessionConfig,
    phase: Phase,
    active_cell: Option<CellId>,
    score: u32,
    lives_remaining: i32,
    seconds_remaining: i32,
    relocation: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
    end_reason: Option<EndReason>,
    rng: StdRng,
    view: V,
    audio: A,
    notifier: N,
    scheduler: S,
}

impl<V, A, N, S> GameSession<V, A, N, S>
where
    V: ViewSink,
    A: AudioSink,
    N: Notifier,
    S: Scheduler,
{
    pub fn new(config: SessionConfig, view: V, audio: A, notifier: N, scheduler: S) -> Self {
        Self::with_rng(config, view, audio, notifier, scheduler, StdRng::from_entropy())
    }

    pub fn with_seed(
        config: SessionConfig,
        view: V,
        audio: A,
        notifier: N,
        scheduler: S,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, view, audio, notifier, scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: SessionConfig,
        view: V,
        audio: A,
        notifier: N,
        scheduler: S,
        rng: StdRng,
    ) -> Self {
        Self {
            lives_remaining: config.lives,
            seconds_remaining: config.session_secs,
            config,
            phase: Phase::Idle,
            active_cell: None,
            score: 0,
            relocation: None,
            countdown: None,
            end_reason: None,
            rng,
            view,
            audio,
            notifier,
            scheduler,
        }
    }

    /// Idle -> Running: paint the initial HUD and start both periodic processes
    pub fn initialize(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "initialize ignored");
            return;
        }

        self.view.set_score(self.score);
        self.view.set_time_left(self.seconds_remaining);
        self.view.set_lives(&lives_label(self.lives_remaining));

        self.relocation = Some(
            self.scheduler
                .schedule_repeating(TimerKind::Relocate, self.config.relocation_interval),
        );
        self.countdown = Some(
            self.scheduler
                .schedule_repeating(TimerKind::Countdown, self.config.countdown_interval),
        );
        self.phase = Phase::Running;

        info!(
            secs = self.seconds_remaining,
            lives = self.lives_remaining,
            interval_ms = self.config.relocation_interval.as_millis() as u64,
            "round started"
        );
    }

    /// Route a fired timer to its process. Handles that are not this round's
    /// live timers (cancelled, or left over from an earlier round) are dropped.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.relocation == Some(handle) {
            self.relocate_target();
        } else if self.countdown == Some(handle) {
            self.tick_countdown();
        } else {
            debug!(timer = %handle.kind(), "stale timer ignored");
        }
    }

    /// Move the target to a uniformly random cell. The previous cell is not
    /// excluded, so the target may stay where it is.
    pub fn relocate_target(&mut self) {
        if !self.is_running() {
            return;
        }

        let Some(cell) = CellId::from_index(self.rng.gen_range(0..CELL_COUNT)) else {
            return;
        };

        for c in CellId::all() {
            self.view.set_cell_active(c, false);
        }
        self.view.set_cell_active(cell, true);
        self.active_cell = Some(cell);

        debug!(%cell, "target relocated");
    }

    /// Pointer-down on `cell`
    pub fn on_cell_activated(&mut self, cell: CellId) {
        if !self.is_running() {
            return;
        }

        if self.active_cell == Some(cell) {
            self.score += 1;
            self.view.set_score(self.score);
            // cleared until the next relocation so one appearance scores once
            self.active_cell = None;
            self.audio.play_hit();
            self.view.set_cell_active(cell, false);
            debug!(%cell, score = self.score, "hit");
        } else {
            self.lives_remaining -= 1;
            self.view.set_lives(&lives_label(self.lives_remaining));
            debug!(%cell, lives = self.lives_remaining, "miss");
            if self.lives_remaining <= 0 {
                self.terminate(EndReason::LivesExhausted);
            }
        }
    }

    /// Pointer-down carrying a raw cell identifier. Unknown identifiers are
    /// ignored and the round continues.
    pub fn on_cell_id(&mut self, raw: &str) {
        match raw.parse::<CellId>() {
            Ok(cell) => self.on_cell_activated(cell),
            Err(e) => warn!(error = %e, "ignoring pointer-down"),
        }
    }

    pub fn tick_countdown(&mut self) {
        if !self.is_running() {
            return;
        }

        self.seconds_remaining -= 1;
        self.view.set_time_left(self.seconds_remaining);
        if self.seconds_remaining <= 0 {
            self.terminate(EndReason::TimeUp);
        }
    }

    /// Stop both timers, announce the result and clear the board.
    /// Only the first call has any effect.
    pub fn terminate(&mut self, reason: EndReason) {
        if !self.is_running() {
            return;
        }

        if let Some(h) = self.relocation.take() {
            self.scheduler.cancel(h);
        }
        if let Some(h) = self.countdown.take() {
            self.scheduler.cancel(h);
        }
        self.phase = Phase::Ended;
        self.end_reason = Some(reason);
        self.active_cell = None;

        info!(%reason, score = self.score, "round over");

        self.audio.play(GAME_OVER_SOUND, self.config.volume);
        self.notifier.notify(&game_over_message(reason, self.score));

        for c in CellId::all() {
            self.view.set_cell_active(c, false);
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives_remaining(&self) -> i32 {
        self.lives_remaining
    }

    pub fn seconds_remaining(&self) -> i32 {
        self.seconds_remaining
    }

    pub fn active_cell(&self) -> Option<CellId> {
        self.active_cell
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
