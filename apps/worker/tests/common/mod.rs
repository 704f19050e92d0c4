//! Common test utilities for worker integration tests
//!
//! Everything here runs against the engine's in-memory stores; nothing
//! needs Postgres or Redis.

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
