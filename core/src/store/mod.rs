//! Fixture store access
//!
//! Connection lifecycle and the CRUD/lookup client used by the resolver and
//! the workbench editor.

mod client;
mod connection;

pub use client::FixtureClient;
pub use connection::StoreConnection;
