//! Common utilities for html2creole.
//!
//! This crate provides shared infrastructure used by all conversion stages:
//! - **Trace Output** - per-conversion debug tracing behind a toggle
//! - **Warnings** - colored notes about tolerated input, on the same toggle

pub mod trace;
