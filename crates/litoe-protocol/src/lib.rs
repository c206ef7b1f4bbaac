//! Shared vocabulary for Litoe.
//!
//! This crate defines the values every other layer agrees on:
//!
//! - **Identity** ([`RoomId`], [`Handle`], [`Mark`]): who is playing,
//!   where, and with which mark.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how room documents are
//!   turned into bytes for replication.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! ```text
//! Sync (bytes) → Protocol (typed documents) → Game (rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Handle, Mark, RoomId};
