//! Concrete status checkers

pub mod http;
pub mod ping;

#[cfg(unix)]
pub mod command;

pub use http::HttpChecker;
pub use ping::PingChecker;

#[cfg(unix)]
pub use command::CommandChecker;
