//! Two-party chat where the parties take strict turns.
//!
//! The connecting client speaks first; the listening responder answers. Each
//! side sends one line, then waits for exactly one line back, until either
//! side sends `\quit`. Each module focuses on one step of that flow:
//!
//! - [`resolver`] turns a host and port into IPv4/IPv6 endpoint candidates.
//! - [`connector`] tries the candidates in order and keeps the first connection.
//! - [`codec`] reads and writes the `<name>> <text>` wire form and spots the sentinel.
//! - [`session`] is the turn-taking state machine that owns the connection.
//! - [`console`] renders a session on a terminal and asks for the user's name.
//! - [`client`] and [`server`] wire the pieces together for the two binaries.
//! - [`cli`] parses the command line for both binaries.
//!
//! Unit tests live next to each module; `tests/` drives whole sessions over
//! loopback TCP and runs the binaries.

pub mod cli;
pub mod client;
pub mod codec;
pub mod connector;
pub mod console;
pub mod error;
pub mod resolver;
pub mod server;
pub mod session;
