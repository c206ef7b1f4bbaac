//! Hotseat demo: two clients in one process share a room through
//! `MemorySync` and play a scripted match, then a rematch handshake.
//!
//! ```text
//! RUST_LOG=debug cargo run -p hotseat
//! ```

use litoe::prelude::*;

/// X takes the anti-diagonal on its third move.
const SCRIPT: &[(usize, usize)] = &[(1, 1), (0, 0), (0, 2), (0, 1), (2, 0)];

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

struct Table {
    host: GameClient,
    guest: GameClient,
}

impl Table {
    /// The client whose handle is `handle`.
    fn client_for(&mut self, handle: &Handle) -> &mut GameClient {
        if self.host.handle() == handle {
            &mut self.host
        } else {
            &mut self.guest
        }
    }
}

async fn wait_live(
    client: &mut GameClient,
    ready: impl Fn(&GameState) -> bool,
) -> Result<GameState, LitoeError> {
    let view = client
        .wait_for(|view| view.is_terminal() || view.state().is_some_and(&ready))
        .await?;
    view.state()
        .cloned()
        .ok_or(LitoeError::ClientClosed)
}

fn show(state: &GameState) {
    println!("{}", state.status());
    println!("{}", state.board);
    println!("clocks: {} / {}\n", state.clocks[0], state.clocks[1]);
}

/// Seats two players, plays [`SCRIPT`], then runs the rematch handshake.
/// Returns the final state of the first game.
async fn play_match(litoe: &Litoe<MemorySync>) -> Result<GameState, LitoeError> {
    let lobby = litoe.lobby();

    let mut host = ClientSession::random();
    let mut guest = ClientSession::random();
    let room = lobby.create_room(&mut host, false).await?;
    println!("{} opened room {room}", host.handle());

    for entry in lobby.list_public_rooms().await? {
        println!(
            "  listed: {} hosted by {} ({} / 2)",
            entry.room_id,
            entry.host.as_ref().map_or("nobody", |h| h.as_str()),
            entry.player_count
        );
    }

    lobby.join_room(&mut guest, &room).await?;
    println!("{} joined\n", guest.handle());

    let mut table = Table {
        host: litoe.open(host.clone(), room.clone()).await,
        guest: litoe.open(guest.clone(), room.clone()).await,
    };

    let mut state = wait_live(&mut table.guest, |s| s.players.len() == 2).await?;
    show(&state);

    for (n, &(row, col)) in SCRIPT.iter().enumerate() {
        let Some(mover) = state.to_move().cloned() else {
            break;
        };
        let client = table.client_for(&mover);
        client.play(Position::new(row, col)?).await?;
        state = wait_live(client, |s| s.board.marks_placed() > n).await?;
        show(&state);
        if state.is_over() {
            break;
        }
    }
    let finished = state.clone();

    // The loser asks for a rematch; the winner's identical intent accepts.
    if let Some(Outcome::Winner(winner)) = &finished.outcome {
        let loser = finished.opponent_of(winner).cloned();
        if let Some(loser) = loser {
            table.client_for(&loser).send(Intent::OfferRematch).await?;
            wait_live(table.client_for(winner), |s| s.rematch_offer.is_some()).await?;
            println!("{loser} offered a rematch");

            table.client_for(winner).send(Intent::OfferRematch).await?;
            state = wait_live(table.client_for(&loser), |s| s.board.marks_placed() == 0).await?;
            println!("{winner} accepted; seats swapped");
            show(&state);
        }
    }

    lobby.leave_room(&mut host).await?;
    lobby.leave_room(&mut guest).await?;
    let gone = table.host.wait_for(RoomView::is_terminal).await?;
    println!("room closed: {gone:?}");

    table.host.shutdown().await;
    table.guest.shutdown().await;
    Ok(finished)
}

#[tokio::main]
async fn main() -> Result<(), LitoeError> {
    litoe::telemetry::init();

    let litoe = Litoe::builder().build(MemorySync::new());
    let finished = play_match(&litoe).await?;
    tracing::info!(status = %finished.status(), "match finished");
    Ok(())
}
