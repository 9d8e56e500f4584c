//! schema-inspector: terminal client for schema inspection services
//!
//! Layers, innermost first:
//! - `domain`: tree model, persisted tree state, formats and server paths
//! - `application`: tree widget, schema browser, event queue
//! - `infrastructure`: HTTP, key-value store, display and download I/O
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
