//! Integration tests for the matchmaking service over the in-process
//! replication adapter.

use litoe_game::{
    GameConfig, GameStateMachine, Intent, InvariantViolation, Outcome, Position, Rejection,
    Transition,
};
use litoe_lobby::{ConflictPolicy, LobbyConfig, LobbyError, MatchmakingService, Submitted};
use litoe_protocol::{Handle, Mark, ProtocolError, RoomId};
use litoe_session::ClientSession;
use litoe_sync::{MemorySync, Query, SyncAdapter, SyncError, Write};

// =========================================================================
// Helpers
// =========================================================================

fn service(config: LobbyConfig) -> MatchmakingService<MemorySync> {
    MatchmakingService::new(MemorySync::new(), GameStateMachine::default(), config)
}

fn session(name: &str) -> ClientSession {
    ClientSession::new(Handle::from(name))
}

fn mv(row: usize, col: usize) -> Intent {
    Intent::Move {
        position: Position::new(row, col).unwrap(),
    }
}

/// ann creates a public room and bob joins it.
async fn seated_pair(
    lobby: &MatchmakingService<MemorySync>,
) -> (RoomId, ClientSession, ClientSession) {
    let mut ann = session("ann");
    let mut bob = session("bob");
    let room = lobby.create_room(&mut ann, false).await.unwrap();
    let joined = lobby.join_room(&mut bob, &room).await.unwrap();
    assert!(joined.is_applied());
    (room, ann, bob)
}

// =========================================================================
// Creating and joining
// =========================================================================

#[tokio::test]
async fn test_create_room_seats_creator() {
    let lobby = service(LobbyConfig::default());
    let mut ann = session("ann");
    let room = lobby.create_room(&mut ann, false).await.unwrap();

    assert!(ann.is_in(&room));
    let state = lobby.fetch_room(&room).await.unwrap();
    assert_eq!(state.players, vec![Handle::from("ann")]);
    assert_eq!(state.clocks, [60, 60]);

    let listed = lobby.list_public_rooms().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].room_id, room);
    assert_eq!(listed[0].host, Some(Handle::from("ann")));
}

#[tokio::test]
async fn test_private_room_is_joinable_but_unlisted() {
    let lobby = service(LobbyConfig::default());
    let mut ann = session("ann");
    let mut bob = session("bob");
    let room = lobby.create_room(&mut ann, true).await.unwrap();

    assert!(lobby.list_public_rooms().await.unwrap().is_empty());
    let joined = lobby.join_room(&mut bob, &room).await.unwrap();
    assert_eq!(joined.state().unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_third_player_becomes_spectator() {
    let lobby = service(LobbyConfig::default());
    let (room, _ann, _bob) = seated_pair(&lobby).await;

    let mut cat = session("cat");
    let result = lobby.join_room(&mut cat, &room).await.unwrap();
    assert_eq!(result, Submitted::Skipped(Rejection::RoomFull));
    assert!(cat.is_in(&room));
    assert_eq!(lobby.fetch_room(&room).await.unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_rejoin_is_silent() {
    let lobby = service(LobbyConfig::default());
    let mut ann = session("ann");
    let room = lobby.create_room(&mut ann, false).await.unwrap();
    let result = lobby.join_room(&mut ann, &room).await.unwrap();
    assert!(matches!(result, Submitted::Skipped(Rejection::AlreadyJoined(_))));
}

#[tokio::test]
async fn test_join_missing_room_fails() {
    let lobby = service(LobbyConfig::default());
    let mut ann = session("ann");
    let err = lobby
        .join_room(&mut ann, &RoomId::from("nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, LobbyError::RoomNotFound(_)));
    assert!(ann.current_room().is_none());
}

// =========================================================================
// Playing
// =========================================================================

#[tokio::test]
async fn test_full_game_through_submit() {
    let lobby = service(LobbyConfig::default());
    let (room, ann, bob) = seated_pair(&lobby).await;

    for (who, (r, c)) in [(&ann, (0, 0)), (&bob, (1, 0)), (&ann, (0, 1)), (&bob, (1, 1))] {
        assert!(lobby.submit(who, &room, mv(r, c)).await.unwrap().is_applied());
    }
    let last = lobby.submit(&ann, &room, mv(0, 2)).await.unwrap();
    let state = last.state().unwrap();
    assert_eq!(state.outcome, Some(Outcome::Winner(Handle::from("ann"))));

    let after = lobby.submit(&bob, &room, mv(2, 2)).await.unwrap();
    assert_eq!(after, Submitted::Skipped(Rejection::GameOver));
}

#[tokio::test]
async fn test_rejected_intent_publishes_nothing() {
    let lobby = service(LobbyConfig::default());
    let (room, _ann, bob) = seated_pair(&lobby).await;
    let before = lobby.fetch_room(&room).await.unwrap();

    let result = lobby.submit(&bob, &room, mv(1, 1)).await.unwrap();
    assert!(matches!(result, Submitted::Skipped(Rejection::NotYourTurn { .. })));
    assert_eq!(lobby.fetch_room(&room).await.unwrap(), before);
}

#[tokio::test]
async fn test_surrogate_moves_follow_game_config() {
    let machine = GameStateMachine::new(GameConfig {
        allow_surrogate_moves: true,
        ..GameConfig::default()
    });
    let lobby = MatchmakingService::new(MemorySync::new(), machine, LobbyConfig::default());
    let (room, ann, _bob) = seated_pair(&lobby).await;

    lobby.submit(&ann, &room, mv(0, 0)).await.unwrap();
    let second = lobby.submit(&ann, &room, mv(1, 1)).await.unwrap();
    assert!(second.is_applied());
    assert_eq!(second.state().unwrap().turn, 0);
}

#[tokio::test]
async fn test_rematch_handshake() {
    let lobby = service(LobbyConfig::default());
    let (room, ann, bob) = seated_pair(&lobby).await;
    let early = lobby.submit(&ann, &room, Intent::Forfeit).await.unwrap();
    assert_eq!(early, Submitted::Skipped(Rejection::GameNotStarted));

    lobby.submit(&ann, &room, mv(0, 0)).await.unwrap();
    lobby.submit(&bob, &room, mv(1, 1)).await.unwrap();
    let forfeited = lobby.submit(&ann, &room, Intent::Forfeit).await.unwrap();
    assert_eq!(
        forfeited.state().unwrap().outcome,
        Some(Outcome::Winner(Handle::from("bob")))
    );

    let offered = lobby.submit(&bob, &room, Intent::OfferRematch).await.unwrap();
    assert_eq!(offered.state().unwrap().rematch_offer, Some(Handle::from("ann")));

    let repeat = lobby.submit(&bob, &room, Intent::OfferRematch).await.unwrap();
    assert!(matches!(repeat, Submitted::Skipped(Rejection::RematchPending { .. })));

    let accepted = lobby.submit(&ann, &room, Intent::AcceptRematch).await.unwrap();
    let state = accepted.state().unwrap();
    assert_eq!(state.players, vec![Handle::from("bob"), Handle::from("ann")]);
    assert!(state.outcome.is_none());
    assert!(state.rematch_offer.is_none());
    assert_eq!(state.board.marks_placed(), 0);
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_leave_keeps_room_until_last_player() {
    let lobby = service(LobbyConfig::default());
    let (room, mut ann, mut bob) = seated_pair(&lobby).await;

    let first = lobby.leave_room(&mut ann).await.unwrap();
    assert_eq!(first.state().unwrap().players, vec![Handle::from("bob")]);
    assert!(ann.current_room().is_none());

    let last = lobby.leave_room(&mut bob).await.unwrap();
    assert_eq!(last, Submitted::Deleted);
    assert!(matches!(
        lobby.fetch_room(&room).await,
        Err(LobbyError::RoomNotFound(_))
    ));
}

#[tokio::test]
async fn test_spectator_leave_touches_nothing() {
    let lobby = service(LobbyConfig::default());
    let (room, _ann, _bob) = seated_pair(&lobby).await;
    let mut cat = session("cat");
    lobby.join_room(&mut cat, &room).await.unwrap();

    let result = lobby.leave_room(&mut cat).await.unwrap();
    assert!(matches!(result, Submitted::Skipped(Rejection::NotAPlayer(_))));
    assert!(cat.current_room().is_none());
    assert_eq!(lobby.fetch_room(&room).await.unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_leave_without_room_fails() {
    let lobby = service(LobbyConfig::default());
    let mut ann = session("ann");
    let err = lobby.leave_room(&mut ann).await.unwrap_err();
    assert!(matches!(err, LobbyError::NotInRoom(_)));
}

// =========================================================================
// Concurrent writers
// =========================================================================

/// Two writes computed from the same snapshot, committed one after the
/// other: what a pair of racing clients looks like to the store.
async fn double_move(
    policy: ConflictPolicy,
) -> (Submitted, Submitted, MatchmakingService<MemorySync>, RoomId) {
    let lobby = service(LobbyConfig {
        conflict_policy: policy,
        ..LobbyConfig::default()
    });
    let (room, ann, _bob) = seated_pair(&lobby).await;
    let base = lobby.fetch_room(&room).await.unwrap();

    let machine = lobby.machine();
    let here = machine
        .apply(&base, ann.handle(), mv(0, 0))
        .unwrap();
    let there = machine
        .apply(&base, ann.handle(), mv(2, 2))
        .unwrap();

    let first = lobby.commit(&room, &base, here).await.unwrap();
    let second = lobby.commit(&room, &base, there).await.unwrap();
    (first, second, lobby, room)
}

#[tokio::test]
async fn test_versioned_policy_supersedes_stale_write() {
    let (first, second, lobby, room) = double_move(ConflictPolicy::Versioned).await;
    assert!(first.is_applied());
    assert_eq!(second, Submitted::Superseded);

    let state = lobby.fetch_room(&room).await.unwrap();
    assert_eq!(state.board.marks_placed(), 1);
    assert_eq!(state.board.get(Position::new(0, 0).unwrap()), Some(Mark::X));
}

#[tokio::test]
async fn test_last_write_wins_policy_overwrites() {
    let (first, second, lobby, room) = double_move(ConflictPolicy::LastWriteWins).await;
    assert!(first.is_applied());
    assert!(second.is_applied());

    // The earlier move is lost, not merged.
    let state = lobby.fetch_room(&room).await.unwrap();
    assert_eq!(state.board.marks_placed(), 1);
    assert!(state.board.get(Position::new(0, 0).unwrap()).is_none());
}

#[tokio::test]
async fn test_versioned_write_to_deleted_room_is_superseded() {
    let lobby = service(LobbyConfig {
        conflict_policy: ConflictPolicy::Versioned,
        ..LobbyConfig::default()
    });
    let (room, ann, _bob) = seated_pair(&lobby).await;
    let base = lobby.fetch_room(&room).await.unwrap();
    let next = lobby.machine().apply(&base, ann.handle(), mv(0, 0)).unwrap();

    lobby.commit(&room, &base, Transition::DeleteRoom).await.unwrap();
    let late = lobby.commit(&room, &base, next).await.unwrap();
    assert_eq!(late, Submitted::Superseded);
}

// =========================================================================
// Admin
// =========================================================================

#[tokio::test]
async fn test_admin_disabled_by_default() {
    let lobby = service(LobbyConfig::default());
    assert!(lobby.admin().is_none());
}

#[tokio::test]
async fn test_admin_delete_all_rooms() {
    let lobby = service(LobbyConfig {
        admin_enabled: true,
        ..LobbyConfig::default()
    });
    let mut ann = session("ann");
    let mut bob = session("bob");
    lobby.create_room(&mut ann, false).await.unwrap();
    lobby.create_room(&mut bob, true).await.unwrap();

    let admin = lobby.admin().unwrap();
    assert_eq!(admin.delete_all_rooms().await.unwrap(), 2);
    let all = lobby.sync().fetch(Query::AllRooms).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_admin_reset_keeps_seat_order() {
    let lobby = service(LobbyConfig {
        admin_enabled: true,
        ..LobbyConfig::default()
    });
    let (room, ann, _bob) = seated_pair(&lobby).await;
    lobby.submit(&ann, &room, mv(1, 1)).await.unwrap();

    let reset = lobby.admin().unwrap().reset_room(&room).await.unwrap();
    let state = reset.state().unwrap();
    assert_eq!(state.players, vec![Handle::from("ann"), Handle::from("bob")]);
    assert_eq!(state.board.marks_placed(), 0);
    assert_eq!(state.turn, 0);
}

#[tokio::test]
async fn test_delete_intent_is_never_honoured() {
    let lobby = service(LobbyConfig::default());
    let (room, ann, _bob) = seated_pair(&lobby).await;
    let eve = session("eve");

    for who in [&eve, &ann] {
        let result = lobby.submit(who, &room, Intent::DeleteRoom).await.unwrap();
        assert_eq!(result, Submitted::Skipped(Rejection::NotPermitted));
    }
    assert_eq!(lobby.fetch_room(&room).await.unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_spectator_cannot_reset() {
    let lobby = service(LobbyConfig::default());
    let (room, ann, bob) = seated_pair(&lobby).await;
    lobby.submit(&ann, &room, mv(0, 0)).await.unwrap();
    let eve = session("eve");

    let reset = Intent::Reset {
        reverse_players: true,
    };
    let result = lobby.submit(&eve, &room, reset.clone()).await.unwrap();
    assert_eq!(result, Submitted::Skipped(Rejection::NotAPlayer(Handle::from("eve"))));
    assert_eq!(lobby.fetch_room(&room).await.unwrap().board.marks_placed(), 1);

    let by_player = lobby.submit(&bob, &room, reset).await.unwrap();
    let state = by_player.state().unwrap();
    assert_eq!(state.board.marks_placed(), 0);
    assert_eq!(state.players, vec![Handle::from("bob"), Handle::from("ann")]);
}

// =========================================================================
// Invalid documents
// =========================================================================

/// Overwrites the room with a document whose turn index is out of range,
/// as a misbehaving peer could.
async fn corrupt(lobby: &MatchmakingService<MemorySync>, room: &RoomId) {
    let mut state = lobby.fetch_room(room).await.unwrap();
    state.turn = 2;
    lobby
        .sync()
        .publish(room, Write::Replace(state))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_document_is_refused_not_panicked_on() {
    let lobby = service(LobbyConfig::default());
    let (room, ann, _bob) = seated_pair(&lobby).await;
    corrupt(&lobby, &room).await;

    let err = lobby.submit(&ann, &room, mv(0, 0)).await.unwrap_err();
    assert!(matches!(
        err,
        LobbyError::Sync(SyncError::Codec(ProtocolError::InvalidDocument(_)))
    ));
    assert!(lobby.list_public_rooms().await.unwrap().is_empty());

    // The machine refuses it too when handed the document directly.
    let raw = lobby
        .sync()
        .fetch(Query::Room(room.clone()))
        .await
        .unwrap()
        .into_room(&room)
        .unwrap();
    assert_eq!(
        lobby.machine().apply(&raw, ann.handle(), mv(0, 0)),
        Err(Rejection::InvalidDocument(InvariantViolation::TurnOutOfRange(2)))
    );
}

#[tokio::test]
async fn test_admin_reset_repairs_invalid_document() {
    let lobby = service(LobbyConfig {
        admin_enabled: true,
        ..LobbyConfig::default()
    });
    let (room, ann, _bob) = seated_pair(&lobby).await;
    corrupt(&lobby, &room).await;

    let repaired = lobby.admin().unwrap().reset_room(&room).await.unwrap();
    assert!(repaired.is_applied());
    let state = lobby.fetch_room(&room).await.unwrap();
    assert_eq!(state.turn, 0);
    assert!(lobby.submit(&ann, &room, mv(0, 0)).await.unwrap().is_applied());
}
