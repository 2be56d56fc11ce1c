//! Droplink benchmarking suite
//!
//! This crate contains benchmarks for the hot paths of artifact linking:
//! UNC source classification and cached share resolution.

pub mod common;

pub use common::*;
