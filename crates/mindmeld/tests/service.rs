//! Integration tests for `LobbyService`, covering the full operation table
//! without a network in between.

use std::time::Duration;

use mindmeld::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

fn service(clock: &ManualClock) -> LobbyService {
    LobbyService::new(
        LobbyRegistry::new(LobbyConfig::default())
            .with_clock(clock.clone())
            .with_categories(Categories::fixed("Flüsse", "Tiere")),
    )
}

fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

/// Creates a lobby hosted by `host` and joins `guests`.
async fn lobby(svc: &LobbyService, host: &str, guests: &[&str]) -> LobbyCode {
    let (code, _) = svc.create_lobby(pid(host), host.into()).await.unwrap();
    for guest in guests {
        svc.join_lobby(&code, pid(guest), (*guest).into()).await.unwrap();
    }
    code
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_lobby_snapshot_has_host_and_defaults() {
    let clock = ManualClock::new(5_000);
    let svc = service(&clock);

    let (code, snap) = svc.create_lobby(pid("h"), "Hanna".into()).await.unwrap();

    assert_eq!(code.as_str().len(), 6);
    assert_eq!(snap.code, code);
    assert_eq!(snap.host_id, pid("h"));
    assert_eq!(snap.created_at, 5_000);
    assert_eq!(snap.settings, Settings::default());
    assert_eq!(snap.players.len(), 1);
    assert!(snap.players[0].is_host);
    assert!(!snap.game_state.is_active);
    assert_eq!(snap.game_state.scores, vec![(pid("h"), 0)]);
}

#[tokio::test]
async fn test_join_lobby_lower_case_code_finds_lobby() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &[]).await;

    let lower = LobbyCode::new(code.as_str().to_lowercase());
    let snap = svc.join_lobby(&lower, pid("g"), "Gus".into()).await.unwrap();
    assert_eq!(snap.players.len(), 2);
}

#[tokio::test]
async fn test_join_lobby_unknown_code_not_found() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let err = svc
        .join_lobby(&LobbyCode::new("ZZZZZZ"), pid("g"), "Gus".into())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_lobby_settings_and_teams_host_only() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &["g"]).await;

    let patch = SettingsPatch {
        match_threshold: Some(50),
        ..SettingsPatch::default()
    };
    let err = svc
        .update_lobby(&code, &pid("g"), LobbyAction::UpdateSettings(patch.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, LobbyError::Forbidden(_)));

    let snap = svc
        .update_lobby(&code, &pid("h"), LobbyAction::UpdateSettings(patch))
        .await
        .unwrap();
    assert_eq!(snap.settings.match_threshold, 50);
    assert_eq!(snap.settings.round_time, 30);

    let snap = svc
        .update_lobby(
            &code,
            &pid("h"),
            LobbyAction::AssignTeam {
                target_player_id: pid("g"),
                team: Some("blue".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(snap.players[1].team.as_deref(), Some("blue"));
}

#[tokio::test]
async fn test_lobby_status_refreshes_presence() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &["g"]).await;

    assert!(svc.release_seat(&code, &pid("g"), 0).await);
    clock.advance(Duration::from_secs(9));

    let snap = svc.lobby_status(&code, &pid("g")).await.unwrap();
    let g = snap.players.iter().find(|p| p.id == pid("g")).unwrap();
    assert!(g.connected);
    assert_eq!(g.last_seen, 9_000);

    let err = svc.lobby_status(&code, &pid("stranger")).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_full_round_flow_with_next_round() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &["a", "b"]).await;

    let snap = svc.start_game(&code, &pid("h")).await.unwrap();
    assert!(snap.game_state.is_active);
    assert_eq!(snap.game_state.current_round, 1);
    assert_eq!(snap.game_state.current_category.as_deref(), Some("Flüsse"));

    let err = svc.join_lobby(&code, pid("late"), "Late".into()).await.unwrap_err();
    assert!(matches!(err, LobbyError::GameInProgress(_)));

    clock.advance(Duration::from_secs(3));
    for (player, answer) in [("h", "Rhein"), ("a", "rhein")] {
        let outcome = svc.submit_answer(&code, &pid(player), Some(answer)).await.unwrap();
        assert!(!outcome.round_complete);
    }
    let outcome = svc.submit_answer(&code, &pid("b"), Some("RHEIN")).await.unwrap();
    assert!(outcome.round_complete);
    let results = outcome.results.unwrap();
    assert_eq!(results.match_count, 3);
    assert!(results.round_success);
    assert_eq!(outcome.lobby.game_state.last_result, Some(results));

    let snap = svc
        .update_lobby(&code, &pid("h"), LobbyAction::NextRound)
        .await
        .unwrap();
    assert_eq!(snap.game_state.current_round, 2);
    assert_eq!(snap.game_state.current_category.as_deref(), Some("Tiere"));
    assert!(snap.game_state.round_answers.is_empty());
    assert!(snap.game_state.last_result.is_none());
    assert_eq!(snap.game_state.streak, 1);
}

#[tokio::test]
async fn test_submit_answer_after_limit_time_expired() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &["g"]).await;
    svc.start_game(&code, &pid("h")).await.unwrap();

    clock.advance(Duration::from_secs(31));
    let err = svc.submit_answer(&code, &pid("g"), Some("x")).await.unwrap_err();
    assert!(matches!(err, LobbyError::TimeExpired { .. }));

    let snap = svc.lobby_status(&code, &pid("h")).await.unwrap();
    assert!(snap.game_state.round_answers.is_empty());
}

#[tokio::test]
async fn test_submit_answer_before_start_not_active() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let code = lobby(&svc, "h", &["g"]).await;

    let err = svc.submit_answer(&code, &pid("g"), Some("x")).await.unwrap_err();
    assert!(matches!(err, LobbyError::GameNotActive(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_create_lobby_sweeps_expired() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);
    let old = lobby(&svc, "old", &[]).await;

    clock.advance(Duration::from_secs(6 * 60 * 60 + 1));
    lobby(&svc, "new", &[]).await;

    assert_eq!(svc.lobby_count().await, 1);
    let err = svc.lobby_status(&old, &pid("old")).await.unwrap_err();
    assert!(matches!(err, LobbyError::LobbyNotFound(_)));
}

#[tokio::test]
async fn test_execute_create_lobby_response_carries_code() {
    let clock = ManualClock::new(0);
    let svc = service(&clock);

    let response = svc
        .execute(Command::CreateLobby {
            player_id: pid("h"),
            player_name: "Hanna".into(),
        })
        .await
        .unwrap();

    assert!(response.success);
    let code = response.lobby_code.unwrap();
    assert_eq!(response.lobby.unwrap().code, code);
    assert!(response.round_complete.is_none());
}
