use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::layout::Rect;

use crate::audio::AudioSink;
use crate::runtime::{GameEvent, Scheduler};
use crate::session::GameSession;
use crate::sinks::{BoardView, PendingNotice};
use crate::ui;

pub type Session<A, S> = GameSession<BoardView, A, PendingNotice, S>;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    /// Game-over message waiting for acknowledgment; input is consumed only to dismiss it
    Notice(String),
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Restart,
    Quit,
}

pub struct App<A: AudioSink, S: Scheduler> {
    pub session: Session<A, S>,
    pub state: AppState,
}

impl<A: AudioSink, S: Scheduler> App<A, S> {
    /// Takes an idle session and starts it
    pub fn new(mut session: Session<A, S>) -> Self {
        session.initialize();
        Self {
            session,
            state: AppState::Playing,
        }
    }

    /// Apply one event. `area` is the frame area the board was last drawn in,
    /// used to map mouse positions to cells.
    pub fn handle(&mut self, event: GameEvent, area: Rect) -> Control {
        if let GameEvent::Key(key) = &event {
            if key.kind != KeyEventKind::Press {
                return Control::Continue;
            }
            if is_quit(key) {
                return Control::Quit;
            }
        }

        match self.state {
            AppState::Playing => {
                match event {
                    GameEvent::Timer(handle) => self.session.on_timer(handle),
                    GameEvent::Mouse(mouse) => {
                        if let MouseEventKind::Down(_) = mouse.kind {
                            if let Some(cell) = ui::cell_at(area, mouse.column, mouse.row) {
                                self.session.on_cell_activated(cell);
                            }
                        }
                    }
                    GameEvent::Key(_) | GameEvent::Resize | GameEvent::Tick => {}
                }
                if let Some(message) = self.session.notifier_mut().take() {
                    self.state = AppState::Notice(message);
                }
            }
            AppState::Notice(_) => {
                let acknowledged = match event {
                    GameEvent::Key(_) => true,
                    GameEvent::Mouse(mouse) => matches!(mouse.kind, MouseEventKind::Down(_)),
                    _ => false,
                };
                if acknowledged {
                    self.state = AppState::Over;
                }
            }
            AppState::Over => {
                if let GameEvent::Key(key) = event {
                    if key.code == KeyCode::Char('r') {
                        return Control::Restart;
                    }
                }
            }
        }

        Control::Continue
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::board::CellId;
    use crate::config::SessionConfig;
    use crate::runtime::{ManualScheduler, TimerKind};
    use crate::session::Phase;
    use assert_matches::assert_matches;
    use crossterm::event::{MouseButton, MouseEvent};

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn app(config: SessionConfig) -> App<RecordingAudio, ManualScheduler> {
        App::new(GameSession::with_seed(
            config,
            BoardView::default(),
            RecordingAudio::default(),
            PendingNotice::default(),
            ManualScheduler::default(),
            99,
        ))
    }

    fn key(code: KeyCode) -> GameEvent {
        GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(cell: CellId) -> GameEvent {
        let r = ui::cell_rects(AREA)[cell.index()];
        GameEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: r.x + r.width / 2,
            row: r.y + r.height / 2,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn timer(app: &App<RecordingAudio, ManualScheduler>, kind: TimerKind) -> GameEvent {
        GameEvent::Timer(app.session.scheduler().handle_for(kind).unwrap())
    }

    #[test]
    fn new_app_starts_round() {
        let app = app(SessionConfig::default());
        assert_eq!(app.session.phase(), Phase::Running);
        assert_eq!(app.state, AppState::Playing);
    }

    #[test]
    fn quit_keys() {
        let mut a = app(SessionConfig::default());
        assert_eq!(a.handle(key(KeyCode::Esc), AREA), Control::Quit);
        assert_eq!(a.handle(key(KeyCode::Char('q')), AREA), Control::Quit);
        let ctrl_c = GameEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(a.handle(ctrl_c, AREA), Control::Quit);
        assert_eq!(a.handle(key(KeyCode::Char('c')), AREA), Control::Continue);
    }

    #[test]
    fn click_on_target_scores() {
        let mut a = app(SessionConfig::default());
        let ev = timer(&a, TimerKind::Relocate);
        a.handle(ev, AREA);
        let target = a.session.active_cell().unwrap();

        a.handle(click(target), AREA);
        assert_eq!(a.session.score(), 1);
    }

    #[test]
    fn click_outside_grid_is_ignored() {
        let mut a = app(SessionConfig::default());
        let ev = GameEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        a.handle(ev, AREA);
        assert_eq!(a.session.lives_remaining(), 3);
    }

    #[test]
    fn mouse_up_is_not_a_click() {
        let mut a = app(SessionConfig::default());
        let r = ui::cell_rects(AREA)[0];
        let ev = GameEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: r.x + 1,
            row: r.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        a.handle(ev, AREA);
        assert_eq!(a.session.lives_remaining(), 3);
    }

    #[test]
    fn game_over_flow_notice_then_over_then_restart() {
        let mut a = app(SessionConfig {
            lives: 1,
            ..SessionConfig::default()
        });
        a.handle(click(CellId::from_index(4).unwrap()), AREA);
        assert_matches!(&a.state, AppState::Notice(m) if m.contains("your lives ran out."));

        // timers and 'r' don't leave the notice; any key acknowledges it
        let ev = timer(&a, TimerKind::Countdown);
        a.handle(ev, AREA);
        assert_matches!(a.state, AppState::Notice(_));
        a.handle(key(KeyCode::Enter), AREA);
        assert_eq!(a.state, AppState::Over);

        assert_eq!(a.handle(key(KeyCode::Char('x')), AREA), Control::Continue);
        assert_eq!(a.handle(key(KeyCode::Char('r')), AREA), Control::Restart);
    }

    #[test]
    fn time_up_reaches_notice() {
        let mut a = app(SessionConfig {
            session_secs: 2,
            ..SessionConfig::default()
        });
        let tick = timer(&a, TimerKind::Countdown);
        a.handle(tick.clone(), AREA);
        assert_eq!(a.state, AppState::Playing);
        a.handle(tick, AREA);
        assert_matches!(&a.state, AppState::Notice(m) if m.contains("time ran out."));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut a = app(SessionConfig::default());
        let mut release = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(a.handle(GameEvent::Key(release), AREA), Control::Continue);
    }
}
