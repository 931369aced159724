mod common;

use std::sync::Arc;
use std::time::Duration;

use battleship_client::session::SessionPoller;
use battleship_client::{
    Accuracy, CellState, ClientError, GameOutcome, GamePhase, GameService, GridId,
    InMemoryService, LifecycleState, MatchRequest, Opponent, PanelId, PlayerStats, RetryPolicy,
    ScriptedGame, SessionConfig, SessionController, SharedBoards, WaitingPlayer,
};
use common::{bot_request, c, ScriptedPresenter};
use tokio_util::sync::CancellationToken;

fn controller(
    service: &Arc<InMemoryService>,
    presenter: &Arc<ScriptedPresenter>,
    request: MatchRequest,
    config: SessionConfig,
) -> SessionController {
    SessionController::new(service.clone(), presenter.clone(), request, config)
}

#[tokio::test(start_paused = true)]
async fn test_opponent_shots_land_on_own_board() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1", "A2", "B3"])
            .opponent_volleys(&[&["A1"], &["A1", "C5"]])
            .min_active_polls(2),
    ));
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    let summaries = ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].outcome, GameOutcome::Lose);
    assert_eq!(summaries[0].opponent, "WPBot");

    let own = *ctl.boards().snapshot().own();
    assert_eq!(own.get(c("A1")), CellState::Hit);
    assert_eq!(own.get(c("A2")), CellState::Ship);
    assert_eq!(own.get(c("B3")), CellState::Ship);
    assert_eq!(own.get(c("C5")), CellState::Miss);
    assert_eq!(presenter.grid(GridId::Own), Some(own));

    assert_eq!(
        ctl.history(),
        &[LifecycleState::Created, LifecycleState::Active, LifecycleState::Ended]
    );
    assert_eq!(
        presenter.last_panel(PanelId::Instructions).as_deref(),
        Some("Game ended You lost!")
    );
    assert_eq!(presenter.last_panel(PanelId::Timer).as_deref(), Some("Timer : 60"));
    assert_eq!(service.calls().abandon, 0);
}

#[tokio::test(start_paused = true)]
async fn test_replayed_volleys_leave_own_board_untouched() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1", "A2"])
            .opponent_volleys(&[&["A1"], &["A1", "B3"], &["A1"]])
            .min_active_polls(3),
    ));
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    ctl.run(&CancellationToken::new()).await.unwrap();
    // first volley, the superset, the shorter replay and the final snapshot
    assert!(service.calls().status >= 4);

    let own = *ctl.boards().snapshot().own();
    assert_eq!(own.get(c("A1")), CellState::Hit);
    assert_eq!(own.get(c("B3")), CellState::Miss);
    assert_eq!(own.get(c("A2")), CellState::Ship);

    // fleet drawn, first volley, second volley; replays push nothing
    let pushes = presenter.grid_history(GridId::Own);
    assert_eq!(pushes.len(), 3);
    assert_eq!(pushes[0].get(c("A1")), CellState::Ship);
    assert_eq!(pushes[1].get(c("A1")), CellState::Hit);
    assert_eq!(pushes[1].get(c("B3")), CellState::Empty);
    assert_eq!(pushes[2], own);
}

#[tokio::test(start_paused = true)]
async fn test_static_board_is_pushed_once() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1"])
            .opponent_volleys(&[&["A1"]])
            .min_active_polls(100),
    ));
    let token = service.create_session(&bot_request()).await.unwrap();
    let initial = service.status(&token).await.unwrap();
    let boards = SharedBoards::new();
    let (own, _offense) = boards.begin_session(&[c("A1")]);
    let presenter = Arc::new(ScriptedPresenter::new());

    let poller = SessionPoller::new(
        service.clone(),
        presenter.clone(),
        token,
        own,
        Duration::from_secs(1),
        RetryPolicy::default(),
        2,
    );
    let cancel = CancellationToken::new();
    let (handle, _snapshots) = poller.spawn(initial, cancel.clone());

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(service.calls().status >= 11);
    let pushes = presenter.grid_history(GridId::Own);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].get(c("A1")), CellState::Hit);
}

#[tokio::test(start_paused = true)]
async fn test_stats_panel_shows_leaderboard_entry() {
    let service = Arc::new(InMemoryService::new().with_game(ScriptedGame::new(&["A1"])));
    service.set_leaderboard(vec![
        PlayerStats {
            nick: "someone".into(),
            games: 2,
            wins: 0,
            points: 5,
            rank: 9,
        },
        PlayerStats {
            nick: "tester".into(),
            games: 10,
            wins: 6,
            points: 120,
            rank: 3,
        },
    ]);
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(service.calls().player_stats, 1);
    assert_eq!(
        presenter.last_panel(PanelId::Stats).as_deref(),
        Some("My stats Games : 10 Points : 120 Rank : 3 Wins : 6")
    );
}

#[tokio::test]
async fn test_lobby_and_leaderboard_listing() {
    let service = InMemoryService::new();
    assert!(service.waiting_players().await.unwrap().is_empty());

    let lobby = vec![
        WaitingPlayer {
            nick: "alice".into(),
            status: "waiting".into(),
        },
        WaitingPlayer {
            nick: "bob".into(),
            status: "waiting".into(),
        },
    ];
    service.set_lobby(lobby.clone());
    let board = vec![PlayerStats {
        nick: "alice".into(),
        games: 4,
        wins: 3,
        points: 40,
        rank: 1,
    }];
    service.set_leaderboard(board.clone());

    assert_eq!(service.waiting_players().await.unwrap(), lobby);
    assert_eq!(service.leaderboard().await.unwrap(), board);
    assert_eq!(service.player_stats("alice").await.unwrap(), board[0]);
    assert_eq!(
        service.player_stats("nobody").await.unwrap(),
        PlayerStats {
            nick: "nobody".into(),
            ..PlayerStats::default()
        }
    );

    let calls = service.calls();
    assert_eq!(calls.lobby, 2);
    assert_eq!(calls.leaderboard, 1);
    assert_eq!(calls.player_stats, 2);
}

#[tokio::test(start_paused = true)]
async fn test_fire_flow_rejects_bad_targets_locally() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["J10"]).turns(2).shot_result("B2", "hit"),
    ));
    let presenter = Arc::new(ScriptedPresenter::with_targets(&["B2", "B2", "Z9", "C3"]));
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    let summaries = ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(service.calls().shots, vec!["B2".to_string(), "C3".to_string()]);
    assert_eq!(
        summaries[0].accuracy,
        Accuracy {
            shots_fired: 2,
            shots_hit: 1
        }
    );
    assert_eq!(presenter.targets_left(), 0);

    let offense = *ctl.boards().snapshot().offense();
    assert_eq!(offense.get(c("B2")), CellState::Hit);
    assert_eq!(offense.get(c("C3")), CellState::Miss);
    assert_eq!(presenter.grid(GridId::Offense), Some(offense));

    let instructions = presenter.panel_history(PanelId::Instructions);
    assert!(instructions.contains(&"Already targeted : B2".to_string()));
    assert!(instructions.iter().any(|t| t.starts_with("Invalid coords : Z9")));
    assert!(instructions.contains(&"Valid coords : C3".to_string()));
    assert_eq!(
        presenter.last_panel(PanelId::Accuracy).as_deref(),
        Some("Shots accuracy : 1 / 2")
    );
    assert_eq!(presenter.last_panel(PanelId::ShotResult).as_deref(), Some("miss C3"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_shot_is_not_counted() {
    let service = Arc::new(
        InMemoryService::new().with_game(ScriptedGame::new(&["J10"]).turns(1)),
    );
    service.fail_next_shots(3);
    let presenter = Arc::new(ScriptedPresenter::with_targets(&["D4", "D4"]));
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    let summaries = ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(service.calls().shots, vec!["D4".to_string()]);
    assert_eq!(summaries[0].accuracy.shots_fired, 1);
    assert!(presenter
        .panel_history(PanelId::Instructions)
        .iter()
        .any(|t| t.starts_with("Shot at D4 failed")));
}

#[tokio::test(start_paused = true)]
async fn test_rematch_starts_from_clean_boards() {
    let service = Arc::new(
        InMemoryService::new()
            .with_game(ScriptedGame::new(&["A1"]).turns(1).shot_result("A5", "hit"))
            .with_game(ScriptedGame::new(&["B2"]).outcome("win")),
    );
    let presenter = Arc::new(ScriptedPresenter::with_targets(&["A5"]));
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(2),
    );

    let summaries = ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].token.as_str(), "token-1");
    assert_eq!(summaries[0].outcome, GameOutcome::Lose);
    assert_eq!(
        summaries[0].accuracy,
        Accuracy {
            shots_fired: 1,
            shots_hit: 1
        }
    );
    assert_eq!(summaries[1].token.as_str(), "token-2");
    assert_eq!(summaries[1].outcome, GameOutcome::Win);
    assert_eq!(summaries[1].accuracy, Accuracy::default());

    let boards = ctl.boards().snapshot();
    assert_eq!(boards.own().get(c("A1")), CellState::Empty);
    assert_eq!(boards.own().get(c("B2")), CellState::Ship);
    assert!(boards.offense().is_empty());

    let calls = service.calls();
    assert_eq!(calls.create, 2);
    assert_eq!(calls.requests[0], calls.requests[1]);

    assert_eq!(
        ctl.history(),
        &[
            LifecycleState::Created,
            LifecycleState::Active,
            LifecycleState::Ended,
            LifecycleState::RematchCountdown,
            LifecycleState::Created,
            LifecycleState::Active,
            LifecycleState::Ended,
        ]
    );
    let instructions = presenter.panel_history(PanelId::Instructions);
    assert!(instructions
        .contains(&"Playing again with WPBot in : 25 press Ctrl-C for more options".to_string()));
    assert!(instructions
        .contains(&"Playing again with WPBot in : 1 press Ctrl-C for more options".to_string()));
    assert!(presenter.panel_history(PanelId::Accuracy).contains(&String::new()));
    assert_eq!(
        presenter.last_panel(PanelId::Instructions).as_deref(),
        Some("Game ended You won!")
    );
}

#[tokio::test(start_paused = true)]
async fn test_lobby_presence_refreshed_every_tenth_poll() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1"]).matchmaking(GamePhase::MatchmakingHuman, 21),
    ));
    let presenter = Arc::new(ScriptedPresenter::new());
    let request = MatchRequest::new("tester", "waiting around", Opponent::AnyChallenger);
    let mut ctl = controller(
        &service,
        &presenter,
        request,
        SessionConfig::default().with_max_games(1),
    );

    ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(service.calls().refresh, 3);
    assert_eq!(
        ctl.history(),
        &[
            LifecycleState::Created,
            LifecycleState::AwaitingJoin,
            LifecycleState::Active,
            LifecycleState::Ended,
        ]
    );
    assert!(presenter
        .panel_history(PanelId::Status)
        .contains(&"waiting".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_bot_matchmaking_needs_no_refresh() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1"]).matchmaking(GamePhase::MatchmakingBot, 2),
    ));
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(
        &service,
        &presenter,
        bot_request(),
        SessionConfig::default().with_max_games(1),
    );

    ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(service.calls().refresh, 0);
    assert_eq!(ctl.history()[1], LifecycleState::AwaitingOpponentReady);
}

#[tokio::test(start_paused = true)]
async fn test_create_failure_surfaces_after_retries() {
    let service = Arc::new(InMemoryService::new().with_game(ScriptedGame::new(&["A1"])));
    service.fail_next_creates(3);
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(&service, &presenter, bot_request(), SessionConfig::default());

    let err = ctl.run(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    let calls = service.calls();
    assert_eq!(calls.create, 3);
    assert_eq!(calls.abandon, 0);
    assert_eq!(ctl.state(), LifecycleState::Created);
}

#[tokio::test(start_paused = true)]
async fn test_failed_matchmaking_polls_show_degraded_status() {
    let service = Arc::new(InMemoryService::new().with_game(ScriptedGame::new(&["A1"])));
    service.fail_next_status(6);
    let presenter = Arc::new(ScriptedPresenter::new());
    let config = SessionConfig::default()
        .with_max_games(1)
        .with_degraded_after(2);
    let mut ctl = controller(&service, &presenter, bot_request(), config);

    let summaries = ctl.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(presenter
        .panel_history(PanelId::Status)
        .contains(&"Connection degraded: 2 failed polls".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_poller_keeps_last_snapshot_while_polls_fail() {
    let service = Arc::new(
        InMemoryService::new().with_game(ScriptedGame::new(&["A1"]).min_active_polls(100)),
    );
    let token = service.create_session(&bot_request()).await.unwrap();
    let initial = service.status(&token).await.unwrap();
    let boards = SharedBoards::new();
    let (own, _offense) = boards.begin_session(&[c("A1")]);
    let presenter = Arc::new(ScriptedPresenter::new());

    service.fail_next_status(6);
    let poller = SessionPoller::new(
        service.clone(),
        presenter.clone(),
        token,
        own,
        Duration::from_secs(1),
        RetryPolicy::default(),
        2,
    );
    let cancel = CancellationToken::new();
    let (handle, snapshots) = poller.spawn(initial.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        presenter.last_panel(PanelId::Status).as_deref(),
        Some("Connection degraded: 2 failed polls, showing last known state")
    );
    assert_eq!(**snapshots.borrow(), initial);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        presenter.last_panel(PanelId::Status).as_deref(),
        Some("game_in_progress")
    );

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(service.calls().status, 8);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_play_abandons_session() {
    let service = Arc::new(
        InMemoryService::new().with_game(ScriptedGame::new(&["A1"]).min_active_polls(1000)),
    );
    let presenter = Arc::new(ScriptedPresenter::new());
    let mut ctl = controller(&service, &presenter, bot_request(), SessionConfig::default());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let (result, _) = tokio::join!(ctl.run(&cancel), async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    assert!(result.unwrap().is_empty());
    assert_eq!(service.calls().abandon, 1);
    assert_eq!(ctl.state(), LifecycleState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_matchmaking_abandons_session() {
    let service = Arc::new(InMemoryService::new().with_game(
        ScriptedGame::new(&["A1"]).matchmaking(GamePhase::MatchmakingHuman, 1000),
    ));
    let presenter = Arc::new(ScriptedPresenter::new());
    let request = MatchRequest::new("tester", "patient", Opponent::AnyChallenger);
    let mut ctl = controller(&service, &presenter, request, SessionConfig::default());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let (result, _) = tokio::join!(ctl.run(&cancel), async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        trigger.cancel();
    });

    assert!(result.unwrap().is_empty());
    assert_eq!(service.calls().abandon, 1);
    assert_eq!(service.calls().board, 0);
    assert_eq!(ctl.state(), LifecycleState::AwaitingJoin);
}
