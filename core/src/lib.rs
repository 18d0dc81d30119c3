//! mock-workbench-core: Platform-agnostic fixture resolution for the mock workbench
//!
//! Resolves stored HTTP fixtures by service code, decodes their bodies, and
//! replays them as delayed, possibly failing responses behind the same track
//! repository contract as the live API. It depends only on abstract platform
//! traits (FixtureStore, StoreConnector, HttpClient, Timer, Environment) and
//! never imports platform-specific code.

pub mod config;
pub mod context;
pub mod error;
pub mod fixture;
pub mod platform;
pub mod resolve;
pub mod store;
pub mod tracks;

#[cfg(test)]
pub mod test_support;
