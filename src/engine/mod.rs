//! The sync engine: fetcher, listener, merger and dispatcher, wired together
//! by [`session::Session`].

pub mod dispatcher;
pub mod fetcher;
pub mod listener;
pub mod merge;
pub mod session;
pub mod transport;

pub use dispatcher::{Command, CommandDispatcher};
pub use fetcher::SnapshotFetcher;
pub use listener::{ConnectionState, Connector, PushListener, TransportEvent};
pub use session::Session;
pub use transport::WsConnector;
