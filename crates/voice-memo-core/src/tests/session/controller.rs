use crate::{
    MemoError, QualityProfile, RECORDINGS_KEY, RecordingStore, SessionState, Settings,
    tests::support::{controller_with, entry, wait_for_state},
};

use std::time::Duration;

/// WHAT: Start then immediate stop saves a zero-length entry at the top
/// WHY: The list must grow by exactly one, prepended, on every stop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_start_then_stop_immediately_then_zero_duration_entry_prepended() {
    // Given: A controller with one saved recording
    let (controller, backend, gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    backend.set_capture_duration_ms(0);

    // When: Recording starts and stops with no elapsed time
    controller.start_recording().await.unwrap();
    let saved = controller.stop_recording().await.unwrap().unwrap();

    // Then: A zero-duration entry heads the list and is persisted
    assert_eq!(saved.duration_seconds, 0);
    assert_eq!(saved.title.as_deref(), Some("Record 002"));
    let list = controller.recordings().await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0], saved);
    assert_eq!(list[1].id, 1);
    assert!(saved.id > 1);

    controller.flush().await;
    let persisted = RecordingStore::parse(&gateway.value(RECORDINGS_KEY).unwrap()).unwrap();
    assert_eq!(persisted, list);
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: Captured milliseconds are floored to whole seconds
/// WHY: Durations are integer seconds at the display boundary
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_capture_of_4999ms_when_stopping_then_duration_is_4_seconds() {
    // Given: A backend that reports 4.999 s of audio
    let (controller, backend, _gateway) = controller_with(&[]).await;
    backend.set_capture_duration_ms(4_999);

    // When: Recording starts and stops
    controller.start_recording().await.unwrap();
    let saved = controller.stop_recording().await.unwrap().unwrap();

    // Then: Duration is truncated
    assert_eq!(saved.duration_seconds, 4);
}

/// WHAT: Starting twice reports a conflict without a second capture
/// WHY: The capture device must never be double-acquired
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_starting_again_then_conflict_and_single_capture() {
    // Given: A running recording
    let (controller, backend, _gateway) = controller_with(&[]).await;
    controller.start_recording().await.unwrap();

    // When: Start is requested again
    let result = controller.start_recording().await;

    // Then: Conflict, still one resource, still recording
    assert!(matches!(result, Err(MemoError::Conflict { .. })));
    assert_eq!(backend.open_resources(), 1);
    assert_eq!(backend.max_open_resources(), 1);
    assert!(controller.state().is_recording());
}

/// WHAT: Permission denial leaves the controller Idle
/// WHY: Denial is recoverable and must not acquire anything
#[tokio::test]
async fn given_permission_denied_when_starting_then_error_and_idle() {
    // Given: A backend that denies the microphone
    let (controller, backend, _gateway) = controller_with(&[]).await;
    backend.deny_permission();

    // When: Recording is requested
    let result = controller.start_recording().await;

    // Then: PermissionDenied, no resource, Idle
    assert!(matches!(result, Err(MemoError::PermissionDenied { .. })));
    assert!(result.as_ref().is_err_and(MemoError::is_user_visible));
    assert_eq!(backend.open_resources(), 0);
    assert_eq!(controller.state(), SessionState::Idle);
}

/// WHAT: A failing capture device leaves the controller Idle
/// WHY: No partial resource may be left held after an acquire failure
#[tokio::test]
async fn given_capture_failure_when_starting_then_error_and_idle() {
    // Given: A backend whose capture fails to start
    let (controller, backend, _gateway) = controller_with(&[]).await;
    backend.fail_capture(true);

    // When: Recording is requested
    let result = controller.start_recording().await;

    // Then: ResourceAcquireFailed and Idle
    assert!(matches!(
        result,
        Err(MemoError::ResourceAcquireFailed { .. })
    ));
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: Stop while Idle is a no-op
/// WHY: Late stop events from the UI must not create entries
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_stopping_recording_then_no_entry() {
    // Given: An idle controller
    let (controller, _backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;

    // When: Stop recording is requested
    let result = controller.stop_recording().await.unwrap();

    // Then: Nothing is created
    assert!(result.is_none());
    assert_eq!(controller.recordings().await.len(), 1);
}

/// WHAT: Settings select the capture quality profile
/// WHY: highQuality is read at every start
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_high_quality_off_when_starting_then_minimal_profile_used() {
    // Given: Settings with high quality disabled
    let (controller, backend, _gateway) = controller_with(&[]).await;
    controller
        .update_settings(Settings {
            high_quality: false,
            auto_save: true,
        })
        .await;

    // When: Recording starts
    controller.start_recording().await.unwrap();

    // Then: The minimal profile was requested
    assert_eq!(backend.last_profile(), Some(QualityProfile::Minimal));
}

/// WHAT: The ticker counts whole seconds while recording and resets on stop
/// WHY: The elapsed counter drives the recording timer display
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_three_seconds_pass_then_elapsed_is_three_and_resets_on_stop() {
    // Given: A running recording
    let (controller, _backend, _gateway) = controller_with(&[]).await;
    controller.start_recording().await.unwrap();

    // When: 3.5 seconds pass
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    // Then: Three ticks were counted
    assert!(matches!(
        controller.state(),
        SessionState::Recording {
            elapsed_seconds: 3,
            ..
        }
    ));

    // And: Stopping resets to Idle and no further ticks mutate state
    controller.stop_recording().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(controller.state(), SessionState::Idle);
}

/// WHAT: Play of an unknown id is rejected
/// WHY: Playback requires the entry to exist in the list
#[tokio::test]
async fn given_unknown_id_when_playing_then_entry_not_found() {
    // Given: A list without id 99
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;

    // When: Playing id 99
    let result = controller.play(99).await;

    // Then: EntryNotFound, nothing acquired
    assert!(matches!(result, Err(MemoError::EntryNotFound { id: 99, .. })));
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: Playing B while A plays releases A before acquiring B
/// WHY: Two playback resources must never be held at once
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_one_playing_when_playing_entry_two_then_one_released_before_two_acquired() {
    // Given: Entry 1 playing
    let entries = [entry(1, Some("A"), 10), entry(2, Some("B"), 20)];
    let (controller, backend, _gateway) = controller_with(&entries).await;
    controller.play(1).await.unwrap();

    // When: Entry 2 is played
    controller.play(2).await.unwrap();

    // Then: Release of 1 precedes acquire of 2 and the final state is Playing(2)
    assert_eq!(
        backend.journal(),
        vec![
            "acquire playback memory://entry-1".to_string(),
            "release playback memory://entry-1".to_string(),
            "acquire playback memory://entry-2".to_string(),
        ]
    );
    assert_eq!(
        controller.state(),
        SessionState::Playing {
            entry_id: 2,
            position_seconds: 0
        }
    );
    assert_eq!(backend.max_open_resources(), 1);
}

/// WHAT: Overlapping play requests are serialized
/// WHY: A play arriving during a pending acquire must not open a second resource
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_slow_load_when_two_plays_overlap_then_at_most_one_resource_open() {
    // Given: A backend whose loads take 200 ms
    let entries = [entry(1, Some("A"), 10), entry(2, Some("B"), 20)];
    let (controller, backend, _gateway) = controller_with(&entries).await;
    backend.set_load_delay(Duration::from_millis(200));

    // When: Two plays are issued concurrently
    let (first, second) = tokio::join!(controller.play(1), controller.play(2));

    // Then: Both succeed in order and only one resource was ever open
    first.unwrap();
    second.unwrap();
    assert_eq!(backend.max_open_resources(), 1);
    assert_eq!(backend.open_resources(), 1);
    assert_eq!(controller.state().active_entry(), Some(2));
}

/// WHAT: Any play/pause/stop sequence keeps at most one resource open
/// WHY: Single-active-resource invariant
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mixed_playback_commands_when_applied_then_never_two_resources() {
    // Given: Three entries
    let entries = [
        entry(1, Some("A"), 10),
        entry(2, Some("B"), 20),
        entry(3, Some("C"), 30),
    ];
    let (controller, backend, _gateway) = controller_with(&entries).await;

    // When: A long mixed sequence runs
    for round in 0..5i64 {
        let id = round % 3 + 1;
        controller.play(id).await.unwrap();
        controller.pause().await.unwrap();
        controller.play(id).await.unwrap();
        controller.play((id % 3) + 1).await.unwrap();
        if round % 2 == 0 {
            controller.stop().await;
        }
    }
    controller.stop().await;

    // Then: The high-water mark never exceeded one and everything is released
    assert_eq!(backend.max_open_resources(), 1);
    assert_eq!(backend.open_resources(), 0);
    assert_eq!(controller.state(), SessionState::Idle);
}

/// WHAT: Pause retains the position and play of the same id resumes
/// WHY: Paused -> Playing must reuse the loaded resource
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_entry_when_playing_same_id_then_resumes_without_reload() {
    // Given: Entry 1 playing at 4 s
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    let mut rx = controller.subscribe();
    controller.play(1).await.unwrap();
    assert!(backend.emit_position(4_200).await);
    wait_for_state(&mut rx, |s| s.position_seconds() == 4).await;

    // When: Paused, then played again
    controller.pause().await.unwrap();
    assert_eq!(
        controller.state(),
        SessionState::Paused {
            entry_id: 1,
            position_seconds: 4
        }
    );
    controller.play(1).await.unwrap();

    // Then: Playing at the same position, loaded only once
    assert_eq!(
        controller.state(),
        SessionState::Playing {
            entry_id: 1,
            position_seconds: 4
        }
    );
    assert_eq!(backend.journal().len(), 1);
}

/// WHAT: Resume and pause are no-ops in the wrong state
/// WHY: Out-of-order UI events must not fail or change state
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_pausing_resuming_and_rewinding_then_nothing_happens() {
    // Given: An idle controller
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;

    // When: Pause, resume, rewind and stop arrive
    controller.pause().await.unwrap();
    controller.resume().await.unwrap();
    controller.rewind().await.unwrap();
    controller.stop().await;

    // Then: Still Idle, nothing acquired
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(backend.journal().is_empty());
}

/// WHAT: Repeated rewinds near the start clamp at zero
/// WHY: Position must never go below 0
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_position_1500ms_when_rewinding_three_times_then_position_is_zero() {
    // Given: Entry 1 playing at 1.5 s
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    let mut rx = controller.subscribe();
    controller.play(1).await.unwrap();
    assert!(backend.emit_position(1_500).await);
    wait_for_state(&mut rx, |s| s.position_seconds() == 1).await;

    // When: Rewinding three times
    controller.rewind().await.unwrap();
    assert_eq!(controller.state().position_seconds(), 0);
    controller.rewind().await.unwrap();
    controller.rewind().await.unwrap();

    // Then: Still playing, at 0
    assert_eq!(
        controller.state(),
        SessionState::Playing {
            entry_id: 1,
            position_seconds: 0
        }
    );
}

/// WHAT: Rewind while paused keeps the Paused state
/// WHY: Rewind never changes which state the session is in
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_paused_at_5s_when_rewinding_then_paused_at_4s() {
    // Given: Entry 1 paused at 5 s
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    let mut rx = controller.subscribe();
    controller.play(1).await.unwrap();
    assert!(backend.emit_position(5_000).await);
    wait_for_state(&mut rx, |s| s.position_seconds() == 5).await;
    controller.pause().await.unwrap();

    // When: Rewinding
    controller.rewind().await.unwrap();

    // Then: Paused one second earlier
    assert_eq!(
        controller.state(),
        SessionState::Paused {
            entry_id: 1,
            position_seconds: 4
        }
    );
}

/// WHAT: End of media returns to Idle with position reset
/// WHY: Playback is never left Paused at the end
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_at_end_when_end_of_media_then_idle_and_released() {
    // Given: Entry 1 playing at 10 s of 10 s
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    let mut rx = controller.subscribe();
    controller.play(1).await.unwrap();
    assert!(backend.emit_position(9_000).await);
    wait_for_state(&mut rx, |s| s.position_seconds() == 9).await;

    // When: The resource reports end of media
    assert!(backend.emit_end_of_media().await);

    // Then: Idle, position 0, resource released
    let state = wait_for_state(&mut rx, SessionState::is_idle).await;
    assert_eq!(state.position_seconds(), 0);
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: A position update reaching the duration ends playback
/// WHY: Natural end is detected even without an explicit end event
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_when_position_reaches_duration_then_idle() {
    // Given: Entry 1 playing
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    let mut rx = controller.subscribe();
    controller.play(1).await.unwrap();

    // When: Position reaches the 10 s media length
    assert!(backend.emit_position(10_000).await);

    // Then: Idle and released
    wait_for_state(&mut rx, SessionState::is_idle).await;
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: Deleting the playing entry stops playback and removes it
/// WHY: No dangling resource and no events for a deleted entry
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_playing_when_deleted_then_idle_removed_and_no_further_events() {
    // Given: Entry 2 playing
    let entries = [entry(1, Some("A"), 10), entry(2, Some("B"), 20)];
    let (controller, backend, gateway) = controller_with(&entries).await;
    let mut rx = controller.subscribe();
    controller.play(2).await.unwrap();

    // When: Entry 2 is deleted
    let removed = controller.delete(2).await.unwrap();

    // Then: Idle, released, removed, persisted
    assert_eq!(removed.id, 2);
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(backend.open_resources(), 0);
    let ids: Vec<i64> = controller.recordings().await.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1]);
    controller.flush().await;
    let persisted = RecordingStore::parse(&gateway.value(RECORDINGS_KEY).unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);

    // And: Late events from the released media never change the state
    rx.borrow_and_update();
    tokio::task::yield_now().await;
    let _ = backend.emit_position(3_000).await;
    let _ = backend.emit_end_of_media().await;
    tokio::task::yield_now().await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(controller.state(), SessionState::Idle);
}

/// WHAT: Deleting another entry leaves playback untouched
/// WHY: Only deletion of the active entry forces a stop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_one_playing_when_entry_two_deleted_then_still_playing() {
    // Given: Entry 1 playing
    let entries = [entry(1, Some("A"), 10), entry(2, Some("B"), 20)];
    let (controller, backend, _gateway) = controller_with(&entries).await;
    controller.play(1).await.unwrap();

    // When: Entry 2 is deleted
    controller.delete(2).await.unwrap();

    // Then: Entry 1 still plays
    assert_eq!(controller.state().active_entry(), Some(1));
    assert_eq!(backend.open_resources(), 1);
}

/// WHAT: A failing load after releasing the previous entry ends Idle
/// WHY: Acquire failures revert without holding anything
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_one_playing_when_entry_two_fails_to_load_then_idle_and_nothing_held() {
    // Given: Entry 1 playing, loads now failing
    let entries = [entry(1, Some("A"), 10), entry(2, Some("B"), 20)];
    let (controller, backend, _gateway) = controller_with(&entries).await;
    controller.play(1).await.unwrap();
    backend.fail_playback(true);

    // When: Entry 2 is played
    let result = controller.play(2).await;

    // Then: Error, Idle, no resource
    assert!(matches!(
        result,
        Err(MemoError::ResourceAcquireFailed { .. })
    ));
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(backend.open_resources(), 0);
}

/// WHAT: Play while recording is a conflict
/// WHY: The capture resource is not interrupted by playback
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_playing_then_conflict() {
    // Given: A running recording
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    controller.start_recording().await.unwrap();

    // When: Play is requested
    let result = controller.play(1).await;

    // Then: Conflict, still recording with one resource
    assert!(matches!(result, Err(MemoError::Conflict { .. })));
    assert!(controller.state().is_recording());
    assert_eq!(backend.open_resources(), 1);
}

/// WHAT: Starting a recording stops active playback first
/// WHY: Only one audio resource may be held
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_when_starting_recording_then_playback_released_first() {
    // Given: Entry 1 playing
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    controller.play(1).await.unwrap();

    // When: Recording starts
    controller.start_recording().await.unwrap();

    // Then: Playback was released before capture was acquired
    let journal = backend.journal();
    assert_eq!(journal[1], "release playback memory://entry-1");
    assert!(journal[2].starts_with("acquire capture"));
    assert_eq!(backend.max_open_resources(), 1);
}

/// WHAT: Rename through the controller trims and persists
/// WHY: Direct user edits flow into the same store
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_when_renamed_then_title_trimmed() {
    // Given: One entry
    let (controller, _backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;

    // When: Renamed with padding
    let title = controller.rename(1, "  Standup notes ").await;

    // Then: Trimmed title stored
    assert_eq!(title.as_deref(), Some("Standup notes"));
    assert_eq!(
        controller.recordings().await[0].title.as_deref(),
        Some("Standup notes")
    );
}

/// WHAT: Shutdown releases playback and finalizes a running capture
/// WHY: Teardown must leave no resource or timer behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_shutting_down_then_capture_saved_and_released() {
    // Given: A running recording
    let (controller, backend, _gateway) = controller_with(&[]).await;
    backend.set_capture_duration_ms(2_000);
    controller.start_recording().await.unwrap();

    // When: The controller shuts down
    controller.shutdown().await;

    // Then: Nothing held, recording kept
    assert_eq!(backend.open_resources(), 0);
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.recordings().await.len(), 1);
}

/// WHAT: Dropping the controller releases held resources
/// WHY: Guaranteed release on every exit path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_playing_when_controller_dropped_then_resource_released() {
    // Given: Entry 1 playing
    let (controller, backend, _gateway) = controller_with(&[entry(1, Some("A"), 10)]).await;
    controller.play(1).await.unwrap();

    // When: The controller is dropped
    drop(controller);
    tokio::task::yield_now().await;

    // Then: The resource was released
    assert_eq!(backend.open_resources(), 0);
    assert_eq!(backend.loaded_uri().as_deref(), Some("memory://entry-1"));
}

/// WHAT: A failing store write does not undo the new entry
/// WHY: The in-memory list is authoritative; persistence is best effort
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_store_when_recording_saved_then_entry_kept_in_memory() {
    // Given: A store that rejects writes
    let (controller, _backend, gateway) = controller_with(&[]).await;
    gateway.fail_writes(true);

    // When: A recording is saved
    controller.start_recording().await.unwrap();
    controller.stop_recording().await.unwrap();
    controller.flush().await;

    // Then: The entry stays in memory, nothing was written
    assert_eq!(controller.recordings().await.len(), 1);
    assert_eq!(gateway.write_count(), 0);
}
