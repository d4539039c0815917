//! Mega-menu client: the editing session, the commit engine, and the HTTP
//! store implementation.
//!
//! Typical wiring: build an [`HttpMenuStore`], hand it to a [`MenuSession`],
//! [`load`](MenuSession::load) the snapshot, then drive edits either
//! directly or through a staged session
//! ([`begin`](MenuSession::begin) / [`commit`](MenuSession::commit) /
//! [`discard`](MenuSession::discard)).

pub mod commit;
pub mod config;
pub mod http;
pub mod observer;
pub mod session;

#[cfg(test)]
mod testing;

pub use commit::{CommitError, CommitFailure, CommitOp, CommitReport};
pub use config::{HttpConfig, SessionConfig};
pub use http::HttpMenuStore;
pub use observer::SessionObserver;
pub use session::{MenuSession, SessionError};
