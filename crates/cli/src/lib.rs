//! Argument parsing and phase orchestration for the three zsync binaries.
//!
//! # Overview
//!
//! This crate is intentionally thin: [`args`] defines one `clap`-derived
//! struct per binary, [`http`] supplies the one concrete HTTP byte-range
//! collaborator, and [`generator`]/[`client`]/[`planner`] each drive their
//! binary's phases using the `control`/`matchscan`/`tstore`/`transfer`
//! crates. The root binaries (`src/bin/*.rs`) are thin wrappers that parse
//! `std::env::args`, call into this crate, and translate the returned
//! [`zsync_core::ExitCode`] into a process exit status.
//!
//! # Errors
//!
//! Each entry point prints a diagnostic to `stderr` and returns a non-zero
//! [`zsync_core::ExitCode`] on failure rather than panicking.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod args;
pub mod client;
pub mod generator;
pub mod http;
pub mod planner;

pub use args::{ClientArgs, GeneratorArgs, PlannerArgs};
