#![allow(dead_code)]
//! Shared test utilities for integration tests.
//!
//! - `fixtures`: a governance pool, a lending pool and a derived pool, written as static config
//! - `mocks`: in-memory chain endpoints and a connector handing them out

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
