//! Relay server for the testsock smoke-test client.
//!
//! Hosts a SockJS endpoint (and its raw WebSocket variant) and broadcasts
//! every text payload it receives to all connected sessions.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
