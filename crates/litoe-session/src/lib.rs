//! Client-side session state for Litoe.
//!
//! There is no server and no authentication. A client is identified by a
//! self-asserted [`Handle`](litoe_protocol::Handle) generated once per
//! process, and remembers at most one room it is currently in.
//!
//! ```text
//! Lobby Layer (above)  ← reads and updates the session's current room
//!     ↕
//! Session Layer (this crate)  ← who this client is, where it is
//!     ↕
//! Protocol Layer (below)  ← provides Handle, RoomId
//! ```

mod handle;
mod session;

pub use handle::random_handle;
pub use session::ClientSession;
