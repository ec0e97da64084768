//! Shared test utilities for pkgset integration tests.
//!
//! `TestPackage` copies a fixture package into a temporary directory so each
//! test can mutate it freely and compare file bytes before and after.

pub mod package;

#[allow(unused_imports)]
pub use package::{fixtures_path, TestPackage};
