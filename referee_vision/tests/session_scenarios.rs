//! End-to-end refereeing sessions against scripted marker positions.

mod common;

use common::{MOVE_DELAY, SESSION_TIMEOUT, SLOW_POLL_MS, ScriptedPlayer, fast_config};
use pretty_assertions::assert_eq;
use referee_vision::core_modules::tracker::PositionSlots;
use referee_vision::phrase::{CaughtSet, Phrase};
use referee_vision::pipeline::{MoveFlags, PerColor, Position, TrackedColor};
use referee_vision::{PlaybackError, Referee, SessionError, SessionOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn referee(config: referee_vision::RefereeConfig, player: &Arc<ScriptedPlayer>) -> Referee {
    let referee = Referee::new(config, player.clone());
    player.attach(referee.slots());
    referee
}

fn place_all(slots: &PositionSlots, position: Position) {
    slots.store_all(&PerColor([position; 3]));
}

fn flags(colors: &[TrackedColor]) -> MoveFlags {
    let mut flags = MoveFlags::default();
    for &color in colors {
        flags[color] = true;
    }
    flags
}

#[tokio::test]
async fn scenario_a_nobody_moves_everyone_wins() {
    let player = Arc::new(ScriptedPlayer::new());
    let referee = referee(fast_config(2), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let handle = referee.start_session().expect("idle referee starts");
    let outcome = timeout(SESSION_TIMEOUT, handle.wait()).await.expect("session finishes").expect("no failure");

    assert_eq!(outcome, SessionOutcome::AllClear);
    let played = player.played();
    assert_eq!(played.len(), 4);
    assert!(played[..3].iter().all(Phrase::is_start));
    assert_eq!(played[3], Phrase::AllClear);
    assert!(!referee.is_running());
}

#[tokio::test]
async fn scenario_b_blue_moves_on_the_first_poll() {
    let player = Arc::new(ScriptedPlayer::with_start_hook(Arc::new(|round: u32, slots: &PositionSlots| {
        if round == 1 {
            std::thread::sleep(MOVE_DELAY);
            slots.store(TrackedColor::Blue, Position::at(50, 50));
        }
    })));
    let referee = referee(fast_config(SLOW_POLL_MS), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let handle = referee.start_session().expect("idle referee starts");
    let outcome = timeout(SESSION_TIMEOUT, handle.wait()).await.expect("session finishes").expect("no failure");

    assert_eq!(
        outcome,
        SessionOutcome::Caught {
            round: 1,
            moved: flags(&[TrackedColor::Blue]),
        }
    );
    let played = player.played();
    assert_eq!(played.len(), 2);
    assert!(played[0].is_start());
    assert_eq!(played[1], Phrase::Caught(CaughtSet::Blue));
}

#[tokio::test]
async fn scenario_c_red_and_green_move_together() {
    let player = Arc::new(ScriptedPlayer::with_start_hook(Arc::new(|round: u32, slots: &PositionSlots| {
        if round == 1 {
            std::thread::sleep(MOVE_DELAY);
            slots.store(TrackedColor::Green, Position::at(30, 12));
            slots.store(TrackedColor::Red, Position::at(10, 40));
        }
    })));
    let referee = referee(fast_config(SLOW_POLL_MS), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let handle = referee.start_session().expect("idle referee starts");
    let outcome = timeout(SESSION_TIMEOUT, handle.wait()).await.expect("session finishes").expect("no failure");

    assert_eq!(
        outcome,
        SessionOutcome::Caught {
            round: 1,
            moved: flags(&[TrackedColor::Green, TrackedColor::Red]),
        }
    );
    assert_eq!(player.played().last(), Some(&Phrase::Caught(CaughtSet::RedGreen)));
}

#[tokio::test]
async fn movement_in_a_later_round_stops_the_session_there() {
    let player = Arc::new(ScriptedPlayer::with_start_hook(Arc::new(|round: u32, slots: &PositionSlots| {
        if round == 2 {
            std::thread::sleep(MOVE_DELAY);
            slots.store(TrackedColor::Red, Position::at(12, 12));
        }
    })));
    let referee = referee(fast_config(SLOW_POLL_MS / 10), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let outcome = timeout(SESSION_TIMEOUT, referee.start_session().expect("starts").wait())
        .await
        .expect("session finishes")
        .expect("no failure");

    let SessionOutcome::Caught { round, moved } = outcome else {
        panic!("expected a catch, got {outcome:?}");
    };
    assert_eq!(round, 2);
    assert_eq!(moved, flags(&[TrackedColor::Red]));
    assert_eq!(player.start_phrases_played(), 2);
    assert_eq!(player.played().last(), Some(&Phrase::Caught(CaughtSet::Red)));
}

#[tokio::test]
async fn second_start_while_running_is_refused() {
    let player = Arc::new(ScriptedPlayer::new());
    let referee = referee(fast_config(10_000), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let first = referee.start_session().expect("idle referee starts");
    assert!(referee.is_running());
    assert!(matches!(referee.start_session(), Err(SessionError::AlreadyRunning)));
    assert!(matches!(referee.engine().start_session(), Err(SessionError::AlreadyRunning)));

    assert!(referee.end_session());
    let outcome = timeout(SESSION_TIMEOUT, first.wait()).await.expect("session ends").expect("no failure");
    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert!(!referee.is_running());

    // Only the first session ever spoke.
    assert_eq!(player.start_phrases_played(), 1);

    let again = referee.start_session().expect("idle again");
    assert_eq!(again.number(), 2);
    referee.end_session();
    let _ = timeout(SESSION_TIMEOUT, again.wait()).await.expect("second session ends");
}

#[tokio::test]
async fn ending_during_a_poll_sleep_is_prompt_and_silent() {
    let player = Arc::new(ScriptedPlayer::new());
    let referee = referee(fast_config(60_000), &player);
    place_all(referee.slots(), Position::at(10, 10));

    let handle = referee.start_session().expect("starts");
    tokio::time::sleep(Duration::from_millis(50)).await;
    referee.end_session();

    let outcome = timeout(Duration::from_secs(2), handle.wait())
        .await
        .expect("interrupt wakes the sleeping session")
        .expect("no failure");
    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert_eq!(player.played().len(), 1);
    assert!(!referee.is_running());
}

#[tokio::test]
async fn ending_during_playback_stops_the_player() {
    let player = Arc::new(ScriptedPlayer::hanging_start());
    let referee = referee(fast_config(10), &player);

    let handle = referee.start_session().expect("starts");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(referee.end_session());

    let outcome = timeout(Duration::from_secs(2), handle.wait())
        .await
        .expect("interrupt releases the playback wait")
        .expect("no failure");
    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert_eq!(player.stop_calls(), 1);
    assert_eq!(player.played().len(), 1);
    assert!(!referee.is_running());
}

#[tokio::test]
async fn start_phrase_failure_ends_the_session_and_frees_the_referee() {
    let player = Arc::new(ScriptedPlayer::failing_start());
    let referee = referee(fast_config(1), &player);

    let result = timeout(SESSION_TIMEOUT, referee.start_session().expect("starts").wait())
        .await
        .expect("session finishes");

    assert!(matches!(
        result,
        Err(SessionError::Playback(PlaybackError::Open {
            phrase: Phrase::Start(_),
            ..
        }))
    ));
    assert!(player.played().is_empty(), "no phrase may follow a failed start");
    assert!(!referee.is_running());
    assert!(referee.start_session().is_ok());
}

#[tokio::test]
async fn markers_out_of_view_are_never_caught() {
    let player = Arc::new(ScriptedPlayer::with_start_hook(Arc::new(|round: u32, slots: &PositionSlots| {
        if round == 1 {
            std::thread::sleep(MOVE_DELAY);
            // Green walks out of view, blue walks into view.
            slots.store(TrackedColor::Green, Position::NotFound);
            slots.store(TrackedColor::Blue, Position::at(70, 20));
        }
    })));
    let referee = referee(fast_config(SLOW_POLL_MS / 10), &player);
    let slots = referee.slots();
    slots.store(TrackedColor::Green, Position::at(10, 10));
    slots.store(TrackedColor::Blue, Position::NotFound);
    slots.store(TrackedColor::Red, Position::NotFound);

    let outcome = timeout(SESSION_TIMEOUT, referee.start_session().expect("starts").wait())
        .await
        .expect("session finishes")
        .expect("no failure");

    // Rounds two and three snapshot blue at (70, 20) and green as missing,
    // and nothing changes after that.
    assert_eq!(outcome, SessionOutcome::AllClear);
    assert_eq!(player.start_phrases_played(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn end_from_another_thread_always_reaches_the_new_session() {
    let player = Arc::new(ScriptedPlayer::new());
    let referee = referee(fast_config(60_000), &player);
    let engine = referee.engine();

    for attempt in 1..=25u64 {
        let handle = referee.start_session().expect("idle referee starts");
        assert_eq!(handle.number(), attempt);

        let ender = engine.clone();
        let ended = std::thread::spawn(move || ender.end_session()).join().expect("end thread");
        assert!(ended);

        let outcome = timeout(Duration::from_secs(2), handle.wait())
            .await
            .expect("the end request reaches this session")
            .expect("no failure");
        assert_eq!(outcome, SessionOutcome::Interrupted);
        assert!(!referee.is_running());
    }
}
