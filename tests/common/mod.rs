//! Shared test utilities for integration tests.
//! This module is not compiled as a test binary. Test files include it with `mod common;`.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
