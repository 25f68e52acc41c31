use whackr::audio::{Played, RecordingAudio};
use whackr::board::CellId;
use whackr::config::SessionConfig;
use whackr::runtime::{ManualScheduler, TimerKind};
use whackr::session::{EndReason, GameSession, Phase};
use whackr::sinks::{BoardView, PendingNotice};

type Session = GameSession<BoardView, RecordingAudio, PendingNotice, ManualScheduler>;

fn started(config: SessionConfig, seed: u64) -> Session {
    let mut s = GameSession::with_seed(
        config,
        BoardView::default(),
        RecordingAudio::default(),
        PendingNotice::default(),
        ManualScheduler::default(),
        seed,
    );
    s.initialize();
    s
}

fn cell(id: &str) -> CellId {
    id.parse().unwrap()
}

/// Relocate until the target lands on `want`
fn relocate_to(s: &mut Session, want: CellId) {
    let h = s.scheduler().handle_for(TimerKind::Relocate).unwrap();
    for _ in 0..1000u32 {
        s.on_timer(h);
        if s.active_cell() == Some(want) {
            return;
        }
    }
    panic!("target never reached cell {want}");
}

#[test]
fn scenario_initial_state() {
    let s = started(SessionConfig::default(), 1);
    assert_eq!(s.score(), 0);
    assert_eq!(s.seconds_remaining(), 60);
    assert_eq!(s.lives_remaining(), 3);
    assert_eq!(s.view().score, "0");
    assert_eq!(s.view().time_left, "60");
    assert_eq!(s.view().lives, "x3");
}

#[test]
fn scenario_hit_on_cell_four() {
    let mut s = started(SessionConfig::default(), 2);
    relocate_to(&mut s, cell("4"));
    assert!(s.view().is_active(cell("4")));

    s.on_cell_id("4");
    assert_eq!(s.score(), 1);
    assert_eq!(s.view().score, "1");
    assert_eq!(s.active_cell(), None);
    assert!(!s.view().is_active(cell("4")));
    assert_eq!(s.audio().played.last(), Some(&Played::HitFromStart));
}

#[test]
fn scenario_miss_while_target_elsewhere() {
    let mut s = started(SessionConfig::default(), 3);
    relocate_to(&mut s, cell("4"));

    s.on_cell_id("2");
    assert_eq!(s.lives_remaining(), 2);
    assert_eq!(s.view().lives, "x2");
    assert_eq!(s.score(), 0);
}

#[test]
fn scenario_lives_run_out() {
    let mut s = started(SessionConfig::default(), 4);
    relocate_to(&mut s, cell("4"));
    for _ in 0..3 {
        s.on_cell_id("2");
    }

    assert_eq!(s.phase(), Phase::Ended);
    assert_eq!(s.end_reason(), Some(EndReason::LivesExhausted));
    assert_eq!(s.view().active_count(), 0);
    assert_eq!(s.scheduler().active_count(), 0);
    assert_eq!(s.scheduler().cancel_calls.len(), 2);
    assert!(s.notifier().history[0].contains("your lives ran out."));
}

#[test]
fn scenario_time_runs_out_with_exact_score() {
    let mut s = started(
        SessionConfig {
            session_secs: 5,
            ..SessionConfig::default()
        },
        5,
    );
    let countdown = s.scheduler().handle_for(TimerKind::Countdown).unwrap();

    let mut hits = 0;
    for id in ["1", "5", "9"] {
        relocate_to(&mut s, cell(id));
        s.on_cell_id(id);
        hits += 1;
    }
    for _ in 0..4 {
        s.on_timer(countdown);
    }
    assert_eq!(s.seconds_remaining(), 1);
    assert!(s.phase() == Phase::Running);

    s.on_timer(countdown);
    assert_eq!(s.seconds_remaining(), 0);
    assert_eq!(s.end_reason(), Some(EndReason::TimeUp));
    assert_eq!(
        s.notifier().history,
        vec![format!("Game Over! time ran out. Final score: {hits}")]
    );
}

#[test]
fn score_never_decreases_and_lives_never_skip() {
    let mut s = started(
        SessionConfig {
            lives: 50,
            ..SessionConfig::default()
        },
        6,
    );
    let reloc = s.scheduler().handle_for(TimerKind::Relocate).unwrap();
    let mut last_score = 0;
    let mut last_lives = s.lives_remaining();

    for round in 0..200usize {
        if round % 3 == 0 {
            s.on_timer(reloc);
        }
        let clicked = CellId::from_index(round % 9).unwrap();
        let was_target = s.active_cell() == Some(clicked);
        s.on_cell_activated(clicked);

        if !s.is_running() {
            break;
        }
        if was_target {
            assert_eq!(s.score(), last_score + 1);
            assert_eq!(s.lives_remaining(), last_lives);
        } else {
            assert_eq!(s.score(), last_score);
            assert_eq!(s.lives_remaining(), last_lives - 1);
        }
        last_score = s.score();
        last_lives = s.lives_remaining();
    }
}

#[test]
fn terminate_twice_has_no_extra_effect() {
    let mut s = started(SessionConfig::default(), 7);
    s.terminate(EndReason::TimeUp);
    let played = s.audio().played.len();
    s.terminate(EndReason::TimeUp);
    assert_eq!(s.audio().played.len(), played);
    assert_eq!(s.notifier().history.len(), 1);
    assert_eq!(s.scheduler().cancel_calls.len(), 2);
}
