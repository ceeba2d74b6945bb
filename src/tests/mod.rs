//! tests/mod.rs
mod config_tests;
