//! Common test utilities for mood engine integration tests
//!
//! Provides catalog fixtures, an engine harness wired to the in-memory
//! stores, and instrumented collaborators for counting and failure injection.

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
