//! Common utilities for the Tessera renderer.
//!
//! This crate provides shared infrastructure used by all renderer components:
//! - **Warning System** - colored terminal output for unsupported input
//! - **Image Hand-off** - the tokens and messages exchanged with an external
//!   image fetcher

pub mod image;
pub mod warning;
